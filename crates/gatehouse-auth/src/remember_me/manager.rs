//! Remember-me token issuance, validation, rotation, and revocation.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use parking_lot::Mutex;
use sha2::Sha256;
use tracing::{debug, info, warn};

use gatehouse_core::config::RememberMeConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::traits::Clock;

use crate::error::AuthError;

use super::token::{self, RememberMeToken, SEPARATOR, TokenExchange};

type HmacSha256 = Hmac<Sha256>;

/// Server-side record of one token series.
#[derive(Debug, Clone)]
struct PersistedToken {
    principal: String,
    /// HMAC-SHA256 of `series:secret` under the configured key.
    digest: Vec<u8>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Issues and validates remember-me tokens.
///
/// Every operation takes the same lock, so validate, rotate, and revoke on a
/// token are serialized and one token value can be exchanged at most once.
pub struct RememberMeTokenManager {
    tokens: Mutex<HashMap<String, PersistedToken>>,
    mac: HmacSha256,
    validity: Duration,
    rotate_on_use: bool,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RememberMeTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RememberMeTokenManager")
            .field("tokens", &self.tokens.lock().len())
            .field("validity", &self.validity)
            .field("rotate_on_use", &self.rotate_on_use)
            .finish()
    }
}

impl RememberMeTokenManager {
    /// Creates a manager keyed with `config.key`.
    pub fn new(config: &RememberMeConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if config.key.is_empty() {
            return Err(AppError::configuration("remember_me.key must not be empty"));
        }
        if config.token_validity_seconds == 0 {
            return Err(AppError::configuration(
                "remember_me.token_validity_seconds must be positive",
            ));
        }

        let mac = HmacSha256::new_from_slice(config.key.as_bytes())
            .map_err(|e| AppError::configuration(format!("Invalid remember-me key: {e}")))?;
        let seconds = i64::try_from(config.token_validity_seconds).map_err(|_| {
            AppError::configuration("remember_me.token_validity_seconds is out of range")
        })?;

        Ok(Self {
            tokens: Mutex::new(HashMap::new()),
            mac,
            validity: Duration::seconds(seconds),
            rotate_on_use: config.rotate_on_use,
            clock,
        })
    }

    /// Fixed validity of newly issued tokens.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// The current instant on the manager's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Issues a new token lineage for `principal`.
    pub fn issue(&self, principal: &str) -> RememberMeToken {
        let now = self.clock.now();
        let series = random_part();
        let secret = random_part();

        let record = PersistedToken {
            principal: principal.to_string(),
            digest: self.digest(&series, &secret),
            issued_at: now,
            expires_at: now + self.validity,
        };
        let token = to_token(&series, &secret, &record);

        self.tokens.lock().insert(series, record);
        info!(principal = %principal, expires_at = %token.expires_at, "Remember-me token issued");

        token
    }

    /// Returns the username bound to a valid token without consuming it.
    pub fn validate(&self, value: &str) -> Result<String, AuthError> {
        let now = self.clock.now();
        let mut tokens = self.tokens.lock();
        let (series, _) = self.check(&mut tokens, value, now)?;
        tokens
            .get(series)
            .map(|record| record.principal.clone())
            .ok_or(AuthError::TokenUnknown)
    }

    /// Validates a token and, when rotation is enabled, replaces its secret
    /// in the same critical section.
    ///
    /// The series and expiry are kept; only the secret changes.
    pub fn exchange(&self, value: &str) -> Result<TokenExchange, AuthError> {
        let now = self.clock.now();
        let mut tokens = self.tokens.lock();
        let (series, _) = self.check(&mut tokens, value, now)?;

        let new_secret = self.rotate_on_use.then(random_part);
        let new_digest = new_secret.as_deref().map(|s| self.digest(series, s));

        let record = tokens.get_mut(series).ok_or(AuthError::TokenUnknown)?;
        let rotated = match (new_secret, new_digest) {
            (Some(secret), Some(digest)) => {
                record.digest = digest;
                debug!(principal = %record.principal, "Remember-me token rotated");
                Some(to_token(series, &secret, record))
            }
            _ => None,
        };

        Ok(TokenExchange {
            principal: record.principal.clone(),
            rotated,
        })
    }

    /// Permanently invalidates the token's series. Unknown or already
    /// revoked values are ignored.
    pub fn revoke(&self, value: &str) -> bool {
        let Some((series, secret)) = token::split(value) else {
            return false;
        };

        let mut tokens = self.tokens.lock();
        let matches = tokens
            .get(series)
            .is_some_and(|record| self.matches(series, secret, &record.digest));
        if !matches {
            return false;
        }

        if let Some(record) = tokens.remove(series) {
            info!(principal = %record.principal, "Remember-me token revoked");
        }
        true
    }

    /// Revokes every token bound to `principal`. Returns how many were removed.
    pub fn revoke_all_for_principal(&self, principal: &str) -> usize {
        let removed = revoke_all(&mut self.tokens.lock(), principal);
        if removed > 0 {
            info!(principal = %principal, count = removed, "Revoked all remember-me tokens");
        }
        removed
    }

    /// Removes every expired token. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut tokens = self.tokens.lock();
        let before = tokens.len();
        tokens.retain(|_, record| now <= record.expires_at);
        before - tokens.len()
    }

    /// Number of stored token series.
    pub fn len(&self) -> usize {
        self.tokens.lock().len()
    }

    /// Whether no tokens are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates `value` against the locked table.
    ///
    /// A known series with the wrong secret means an old secret of a rotated
    /// lineage is being replayed; every token of that principal is revoked.
    fn check<'v>(
        &self,
        tokens: &mut HashMap<String, PersistedToken>,
        value: &'v str,
        now: DateTime<Utc>,
    ) -> Result<(&'v str, &'v str), AuthError> {
        let (series, secret) = token::split(value).ok_or(AuthError::TokenUnknown)?;
        let record = tokens.get(series).ok_or(AuthError::TokenUnknown)?;

        if !self.matches(series, secret, &record.digest) {
            let principal = record.principal.clone();
            let removed = revoke_all(tokens, &principal);
            warn!(
                principal = %principal,
                revoked = removed,
                "Remember-me secret mismatch for known series, possible token theft"
            );
            return Err(AuthError::TokenUnknown);
        }

        if now > record.expires_at {
            debug!(principal = %record.principal, "Remember-me token expired");
            tokens.remove(series);
            return Err(AuthError::TokenExpired);
        }

        Ok((series, secret))
    }

    fn digest(&self, series: &str, secret: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(series.as_bytes());
        mac.update(&[SEPARATOR as u8]);
        mac.update(secret.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Constant-time digest comparison.
    fn matches(&self, series: &str, secret: &str, expected: &[u8]) -> bool {
        let mut mac = self.mac.clone();
        mac.update(series.as_bytes());
        mac.update(&[SEPARATOR as u8]);
        mac.update(secret.as_bytes());
        mac.verify_slice(expected).is_ok()
    }
}

fn revoke_all(tokens: &mut HashMap<String, PersistedToken>, principal: &str) -> usize {
    let before = tokens.len();
    tokens.retain(|_, record| record.principal != principal);
    before - tokens.len()
}

/// 256 random bits, URL-safe base64 without padding.
fn random_part() -> String {
    URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>())
}

fn to_token(series: &str, secret: &str, record: &PersistedToken) -> RememberMeToken {
    RememberMeToken {
        value: format!("{series}{SEPARATOR}{secret}"),
        principal: record.principal.clone(),
        issued_at: record.issued_at,
        expires_at: record.expires_at,
    }
}
