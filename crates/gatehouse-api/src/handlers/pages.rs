//! Landing, failure, and identity pages.

use axum::Json;
use axum::extract::State;
use axum::response::Html;
use serde::{Deserialize, Serialize};

use gatehouse_auth::AuthMethod;
use gatehouse_core::types::SessionId;

use crate::extractors::CurrentUser;
use crate::state::AppState;

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    /// Principal username.
    pub username: String,
    /// Granted roles, sorted.
    pub roles: Vec<String>,
    /// Bound session, absent for HTTP Basic requests.
    pub session_id: Option<SessionId>,
    /// `session`, `basic`, or `remember_me`.
    pub method: String,
}

/// GET {default_success_url}
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<!doctype html><html><body><h1>Gatehouse</h1><a href="{}">Sign out</a></body></html>"#,
        state.config.auth.logout_url
    ))
}

/// GET {failure_url}
pub async fn login_failed(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<!doctype html><html><body><p>Invalid username or password.</p><a href="{}">Try again</a></body></html>"#,
        state.config.auth.login_page
    ))
}

/// GET /me
pub async fn whoami(user: CurrentUser) -> Json<WhoAmIResponse> {
    let method = match user.method {
        AuthMethod::Session => "session",
        AuthMethod::Basic => "basic",
        AuthMethod::RememberMe { .. } => "remember_me",
    };

    Json(WhoAmIResponse {
        username: user.principal.username.clone(),
        roles: user.principal.roles.iter().cloned().collect(),
        session_id: user.session.as_ref().map(|s| s.id),
        method: method.to_string(),
    })
}
