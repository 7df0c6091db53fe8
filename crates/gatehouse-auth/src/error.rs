//! Per-request authentication outcomes.

use thiserror::Error;

use gatehouse_core::error::{AppError, ErrorKind};

/// Why the gate refused a request.
///
/// None of these is fatal: each is a per-request outcome and the caller is
/// simply asked to (re-)authenticate. `UnknownPrincipal` and `BadCredential`
/// share one message and are collapsed by [`AuthError::collapse`] before they
/// leave the gate, so a caller cannot tell which one happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No principal with the presented username exists.
    #[error("Invalid username or password")]
    UnknownPrincipal,
    /// The presented secret does not match the stored credential.
    #[error("Invalid username or password")]
    BadCredential,
    /// Neither a live session nor a valid remember-me token was presented.
    #[error("Authentication required")]
    NotAuthenticated,
    /// The principal lacks the role required by the requested path.
    #[error("Access denied")]
    Forbidden,
    /// The remember-me token is past its expiry.
    #[error("Remember-me token has expired")]
    TokenExpired,
    /// The remember-me token is malformed, revoked, or was never issued.
    #[error("Remember-me token is not recognized")]
    TokenUnknown,
    /// The principal already holds the maximum number of sessions and the
    /// overflow strategy rejects new logins.
    #[error("Maximum concurrent sessions ({0}) reached")]
    SessionLimitReached(u32),
    /// A collaborator (credential store, password verifier) failed.
    #[error("Authentication backend failure: {0}")]
    Internal(String),
}

impl AuthError {
    /// Fold both credential failures into the single generic failure that
    /// callers are allowed to observe.
    pub fn collapse(self) -> Self {
        match self {
            Self::UnknownPrincipal | Self::BadCredential => Self::BadCredential,
            other => other,
        }
    }

    /// Whether the caller should be sent back to the login entry point.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::UnknownPrincipal
                | Self::BadCredential
                | Self::NotAuthenticated
                | Self::TokenExpired
                | Self::TokenUnknown
        )
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::UnknownPrincipal
            | AuthError::BadCredential
            | AuthError::NotAuthenticated
            | AuthError::TokenExpired
            | AuthError::TokenUnknown => ErrorKind::Authentication,
            AuthError::Forbidden => ErrorKind::Authorization,
            AuthError::SessionLimitReached(_) => ErrorKind::Conflict,
            AuthError::Internal(_) => ErrorKind::Internal,
        };
        AppError::new(kind, err.collapse().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_are_indistinguishable() {
        let unknown = AuthError::UnknownPrincipal.collapse();
        let bad = AuthError::BadCredential.collapse();
        assert_eq!(unknown, bad);
        assert_eq!(
            AuthError::UnknownPrincipal.to_string(),
            AuthError::BadCredential.to_string()
        );

        let a: AppError = AuthError::UnknownPrincipal.into();
        let b: AppError = AuthError::BadCredential.into();
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.message, b.message);
    }

    #[test]
    fn test_collapse_keeps_other_kinds() {
        assert_eq!(AuthError::TokenExpired.collapse(), AuthError::TokenExpired);
        assert_eq!(AuthError::Forbidden.collapse(), AuthError::Forbidden);
    }

    #[test]
    fn test_forbidden_maps_to_authorization() {
        let err: AppError = AuthError::Forbidden.into();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(!AuthError::Forbidden.requires_login());
        assert!(AuthError::TokenUnknown.requires_login());
    }
}
