//! The authentication gate: login, logout, per-request authentication, and
//! access decisions.

use std::sync::Arc;

use tracing::{debug, info, warn};

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::events::EventPublisher;
use gatehouse_core::traits::{Clock, CredentialStore, PasswordVerifier};
use gatehouse_core::types::{Principal, SessionId};

use crate::error::AuthError;
use crate::remember_me::{RememberMeToken, RememberMeTokenManager};
use crate::session::{Session, SessionRegistry};

use super::access::{AccessPolicy, Requirement};

/// Credentials extracted from an inbound request.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Session identifier from the session cookie.
    pub session_id: Option<SessionId>,
    /// `(username, password)` from an `Authorization: Basic` header.
    pub basic: Option<(String, String)>,
    /// Remember-me token value from the remember-me cookie.
    pub remember_me: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("session_id", &self.session_id)
            .field("basic", &self.basic.as_ref().map(|(user, _)| user))
            .field("remember_me", &self.remember_me.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// How a request was authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// A live session was presented.
    Session,
    /// Stateless HTTP Basic credentials; no session was created.
    Basic,
    /// A remember-me token re-established a new session.
    RememberMe {
        /// Replacement token the client must store, when rotation is on.
        rotated: Option<RememberMeToken>,
    },
}

/// An authenticated request.
#[derive(Debug, Clone)]
pub struct Authentication {
    /// The resolved principal.
    pub principal: Principal,
    /// The session the request is bound to, if any.
    pub session: Option<Session>,
    /// How the principal was authenticated.
    pub method: AuthMethod,
}

impl Authentication {
    /// Whether the gate admitted a new session while authenticating.
    pub fn is_new_session(&self) -> bool {
        matches!(self.method, AuthMethod::RememberMe { .. })
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated principal.
    pub principal: Principal,
    /// The newly admitted session.
    pub session: Session,
    /// Persistent-login token, if one was requested and remember-me is enabled.
    pub remember_me: Option<RememberMeToken>,
    /// Sessions of the same principal evicted by this login.
    pub evicted: Vec<Session>,
}

/// Access decision for one request.
#[derive(Debug, Clone)]
pub enum AccessDecision {
    /// The path is public; no authentication was attempted.
    Public,
    /// The request is authenticated and satisfies the path requirement.
    Granted(Authentication),
    /// The request is authenticated but lacks the required role.
    Forbidden(Authentication),
}

impl AccessDecision {
    /// Collapse into a result, mapping [`AccessDecision::Forbidden`] to
    /// [`AuthError::Forbidden`].
    pub fn into_result(self) -> Result<Option<Authentication>, AuthError> {
        match self {
            Self::Public => Ok(None),
            Self::Granted(auth) => Ok(Some(auth)),
            Self::Forbidden(_) => Err(AuthError::Forbidden),
        }
    }
}

/// Orchestrates login, logout, and admission decisions.
///
/// Collaborator calls (credential lookup, password verification) are awaited
/// before any registry or token state is touched, and nothing is awaited
/// after. A request cancelled mid-flight therefore never leaves a
/// half-admitted session behind.
#[derive(Clone)]
pub struct AuthenticationGate {
    credentials: Arc<dyn CredentialStore>,
    verifier: Arc<dyn PasswordVerifier>,
    registry: Arc<SessionRegistry>,
    remember_me: Arc<RememberMeTokenManager>,
    policy: AccessPolicy,
    http_basic: bool,
    remember_me_enabled: bool,
}

impl std::fmt::Debug for AuthenticationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationGate")
            .field("registry", &self.registry)
            .field("remember_me", &self.remember_me)
            .field("rules", &self.policy.rules().len())
            .field("http_basic", &self.http_basic)
            .field("remember_me_enabled", &self.remember_me_enabled)
            .finish()
    }
}

impl AuthenticationGate {
    /// Creates a gate from its components. HTTP Basic and remember-me are
    /// enabled.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        verifier: Arc<dyn PasswordVerifier>,
        registry: Arc<SessionRegistry>,
        remember_me: Arc<RememberMeTokenManager>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            credentials,
            verifier,
            registry,
            remember_me,
            policy,
            http_basic: true,
            remember_me_enabled: true,
        }
    }

    /// Builds the registry, token manager, and access policy from configuration.
    pub fn from_config(
        config: &AppConfig,
        credentials: Arc<dyn CredentialStore>,
        verifier: Arc<dyn PasswordVerifier>,
        clock: Arc<dyn Clock>,
        events: EventPublisher,
    ) -> Result<Self, AppError> {
        let registry = Arc::new(SessionRegistry::new(&config.session, clock.clone(), events));
        let remember_me = Arc::new(RememberMeTokenManager::new(&config.remember_me, clock)?);
        let policy = AccessPolicy::from_config(&config.access, &config.auth)?;

        Ok(
            Self::new(credentials, verifier, registry, remember_me, policy)
                .with_http_basic(config.auth.http_basic)
                .with_remember_me(config.remember_me.enabled),
        )
    }

    /// Enables or disables `Authorization: Basic` credentials.
    pub fn with_http_basic(mut self, enabled: bool) -> Self {
        self.http_basic = enabled;
        self
    }

    /// Enables or disables remember-me issuance and validation.
    pub fn with_remember_me(mut self, enabled: bool) -> Self {
        self.remember_me_enabled = enabled;
        self
    }

    /// The session registry.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// The remember-me token manager.
    pub fn remember_me(&self) -> &Arc<RememberMeTokenManager> {
        &self.remember_me
    }

    /// The access policy.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Authenticates `username` with `secret` and admits a new session.
    ///
    /// Any earlier session of the principal beyond the limit is evicted. When
    /// `remember` is set and remember-me is enabled, a token is issued too.
    /// Unknown usernames and wrong passwords fail with the same
    /// [`AuthError::BadCredential`].
    pub async fn login(
        &self,
        username: &str,
        secret: &str,
        remember: bool,
    ) -> Result<LoginOutcome, AuthError> {
        let principal = match self.check_credentials(username, secret).await {
            Ok(principal) => principal,
            Err(e) => {
                warn!(username = %username, reason = ?e, "Login failed");
                return Err(e.collapse());
            }
        };

        let admission = self.registry.admit(&principal.username)?;
        let remember_me = (remember && self.remember_me_enabled)
            .then(|| self.remember_me.issue(&principal.username));

        info!(
            principal = %principal.username,
            session_id = %admission.session.id,
            evicted = admission.evicted.len(),
            remember_me = remember_me.is_some(),
            "Login successful"
        );

        Ok(LoginOutcome {
            principal,
            session: admission.session,
            remember_me,
            evicted: admission.evicted,
        })
    }

    /// Resolves the principal behind a request.
    ///
    /// Tried in order: a live session, HTTP Basic credentials, a remember-me
    /// token. A valid remember-me token admits a new session.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Authentication, AuthError> {
        if let Some(id) = &credentials.session_id {
            if let Some(auth) = self.authenticate_session(id).await? {
                return Ok(auth);
            }
        }

        if self.http_basic {
            if let Some((username, password)) = &credentials.basic {
                let principal = self
                    .check_credentials(username, password)
                    .await
                    .map_err(|e| {
                        debug!(username = %username, reason = ?e, "Basic authentication failed");
                        e.collapse()
                    })?;
                return Ok(Authentication {
                    principal,
                    session: None,
                    method: AuthMethod::Basic,
                });
            }
        }

        if self.remember_me_enabled {
            if let Some(value) = &credentials.remember_me {
                return self.authenticate_remember_me(value).await;
            }
        }

        Err(AuthError::NotAuthenticated)
    }

    /// Ends a session and revokes the caller's remember-me token. Absent
    /// sessions and unknown tokens are ignored.
    pub fn logout(&self, session_id: Option<&SessionId>, remember_me: Option<&str>) {
        if let Some(id) = session_id {
            self.registry.invalidate(id);
        }
        if let Some(value) = remember_me {
            self.remember_me.revoke(value);
        }
    }

    /// Ends every session and revokes every token of `username`, e.g. after
    /// a credential change.
    pub fn invalidate_principal(&self, username: &str) {
        let sessions = self.registry.invalidate_all_for_principal(username);
        let tokens = self.remember_me.revoke_all_for_principal(username);
        info!(
            principal = %username,
            sessions = sessions.len(),
            tokens,
            "Principal invalidated"
        );
    }

    /// Decides whether a request for `path` may proceed.
    ///
    /// Public paths are decided without authenticating. Otherwise an
    /// unauthenticated request fails with the authentication error and an
    /// authenticated one lacking the required role is
    /// [`AccessDecision::Forbidden`].
    pub async fn authorize(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<AccessDecision, AuthError> {
        let requirement = self.policy.requirement_for(path);
        if *requirement == Requirement::PermitAll {
            return Ok(AccessDecision::Public);
        }

        let auth = self.authenticate(credentials).await?;
        if requirement.is_satisfied_by(&auth.principal) {
            Ok(AccessDecision::Granted(auth))
        } else {
            warn!(
                principal = %auth.principal.username,
                path = %path,
                requirement = %requirement,
                "Access denied"
            );
            Ok(AccessDecision::Forbidden(auth))
        }
    }

    async fn check_credentials(&self, username: &str, secret: &str) -> Result<Principal, AuthError> {
        let Some(principal) = self.credentials.find_by_username(username).await? else {
            self.verifier.verify_dummy(secret).await;
            return Err(AuthError::UnknownPrincipal);
        };

        if self.verifier.verify(secret, &principal.credential_hash).await? {
            Ok(principal)
        } else {
            Err(AuthError::BadCredential)
        }
    }

    async fn authenticate_session(&self, id: &SessionId) -> Result<Option<Authentication>, AuthError> {
        let Some(session) = self.registry.touch(id) else {
            debug!(session_id = %id, "Presented session is not live");
            return Ok(None);
        };

        match self.credentials.find_by_username(&session.principal).await? {
            Some(principal) => Ok(Some(Authentication {
                principal,
                session: Some(session),
                method: AuthMethod::Session,
            })),
            None => {
                warn!(
                    session_id = %id,
                    principal = %session.principal,
                    "Session principal no longer exists"
                );
                self.registry.invalidate(id);
                Ok(None)
            }
        }
    }

    async fn authenticate_remember_me(&self, value: &str) -> Result<Authentication, AuthError> {
        let username = self.remember_me.validate(value)?;

        let Some(principal) = self.credentials.find_by_username(&username).await? else {
            warn!(principal = %username, "Remember-me token for missing principal");
            self.remember_me.revoke_all_for_principal(&username);
            return Err(AuthError::TokenUnknown);
        };

        // Consume the token before touching the registry: a request that
        // loses the exchange must not evict anyone.
        let exchange = self.remember_me.exchange(value)?;
        let admission = match self.registry.admit(&principal.username) {
            Ok(admission) => admission,
            Err(e) => {
                // The client never sees the rotated value; drop the series so
                // its stale cookie reads as unknown rather than stolen.
                if let Some(rotated) = &exchange.rotated {
                    self.remember_me.revoke(&rotated.value);
                }
                return Err(e);
            }
        };

        info!(
            principal = %principal.username,
            session_id = %admission.session.id,
            rotated = exchange.rotated.is_some(),
            "Session re-established from remember-me token"
        );

        Ok(Authentication {
            principal,
            session: Some(admission.session),
            method: AuthMethod::RememberMe {
                rotated: exchange.rotated,
            },
        })
    }
}
