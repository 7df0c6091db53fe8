//! Remember-me token values handed to clients.

use chrono::{DateTime, Utc};

/// Separator between the series and secret halves of a token value.
pub(crate) const SEPARATOR: char = ':';

/// A token as issued to a client.
#[derive(Clone, PartialEq, Eq)]
pub struct RememberMeToken {
    /// Bearer value to store in the client cookie.
    pub value: String,
    /// Username the token is bound to.
    pub principal: String,
    /// When the token lineage was first issued.
    pub issued_at: DateTime<Utc>,
    /// Fixed expiry; never extended by use.
    pub expires_at: DateTime<Utc>,
}

impl RememberMeToken {
    /// Seconds until expiry as seen from `now`, floored at zero.
    pub fn max_age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

impl std::fmt::Debug for RememberMeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RememberMeToken")
            .field("value", &"[REDACTED]")
            .field("principal", &self.principal)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of exchanging a token for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchange {
    /// Username the token was bound to.
    pub principal: String,
    /// Replacement token when rotation is enabled. The presented value is
    /// no longer valid once this is `Some`.
    pub rotated: Option<RememberMeToken>,
}

/// Split a token value into `(series, secret)`.
pub(crate) fn split(value: &str) -> Option<(&str, &str)> {
    let (series, secret) = value.split_once(SEPARATOR)?;
    if series.is_empty() || secret.is_empty() || secret.contains(SEPARATOR) {
        return None;
    }
    Some((series, secret))
}
