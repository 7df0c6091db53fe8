//! Auth handlers — login form, login, logout, access denied.

use std::collections::HashMap;

use axum::Form;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use gatehouse_auth::AuthError;
use gatehouse_core::error::AppError;

use crate::cookies;
use crate::error::ApiError;
use crate::state::AppState;

/// GET {login_page}
pub async fn login_form(State(state): State<AppState>) -> Html<String> {
    let auth = &state.config.auth;
    let remember_me = &state.config.remember_me;

    let remember_field = if remember_me.enabled {
        format!(
            r#"<label><input type="checkbox" name="{}"> Remember me</label>"#,
            remember_me.parameter
        )
    } else {
        String::new()
    };

    Html(format!(
        r#"<!doctype html>
<html><body>
<form method="post" action="{action}">
<input name="{username}" placeholder="Username">
<input name="{password}" type="password" placeholder="Password">
{remember_field}
<button type="submit">Sign in</button>
</form>
</body></html>"#,
        action = auth.login_page,
        username = auth.username_parameter,
        password = auth.password_parameter,
    ))
}

/// POST {login_page}
///
/// Redirects to the success URL with fresh cookies, or to the failure URL.
/// Unknown users, wrong passwords, and a full session quota all look the
/// same to the client.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let config = &state.config;
    let username = form
        .get(&config.auth.username_parameter)
        .map(|s| s.trim())
        .unwrap_or_default();
    let password = form
        .get(&config.auth.password_parameter)
        .map(String::as_str)
        .unwrap_or_default();
    let remember =
        cookies::remember_me_requested(form.get(&config.remember_me.parameter).map(String::as_str));

    let previous = cookies::session_id(config, &jar);

    let outcome = match state.gate.login(username, password, remember).await {
        Ok(outcome) => outcome,
        Err(AuthError::Internal(message)) => return Err(AppError::internal(message).into()),
        Err(e) => {
            debug!(reason = %e, "Redirecting failed login");
            return Ok(Redirect::to(&config.auth.failure_url).into_response());
        }
    };

    if let Some(previous) = previous.filter(|id| *id != outcome.session.id) {
        state.gate.registry().invalidate(&previous);
    }

    let mut jar = cookies::set_session(jar, config, outcome.session.id);
    if let Some(token) = &outcome.remember_me {
        jar = cookies::set_remember_me(jar, config, token, state.gate.remember_me().now());
    }

    Ok((jar, Redirect::to(&config.auth.default_success_url)).into_response())
}

/// GET|POST {logout_url}
///
/// Idempotent: logging out without a session still clears both cookies.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let config = &state.config;
    let session_id = cookies::session_id(config, &jar);
    let token = cookies::remember_me_value(config, &jar);

    state.gate.logout(session_id.as_ref(), token.as_deref());

    let jar = cookies::clear_remember_me(cookies::clear_session(jar, config), config);
    (jar, Redirect::to(&config.auth.logout_success_url))
}

/// GET {access_denied_page}
pub async fn access_denied() -> ApiError {
    AuthError::Forbidden.into()
}
