//! Access middleware evaluated before every handler.
//!
//! Runs the gate's access decision for the request path. Granted requests
//! get their [`Authentication`] inserted into request extensions; a session
//! re-established from a remember-me token also gets fresh cookies on the
//! response.

use axum::extract::{Request, State};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use gatehouse_auth::{AccessDecision, AuthError, AuthMethod, Authentication};

use crate::cookies;
use crate::error::ApiError;
use crate::state::AppState;

/// Challenge returned to clients that presented Basic credentials.
const BASIC_CHALLENGE: &str = "Basic realm=\"gatehouse\"";

/// Blocks requests that do not satisfy the access rule of their path.
///
/// Unauthenticated requests are redirected to the login page (or challenged
/// with `401` when they carried Basic credentials); authenticated requests
/// lacking a role are redirected to the access-denied page.
pub async fn require_access(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let config = &state.config;
    let credentials = cookies::credentials(config, &jar, request.headers());
    let path = request.uri().path().to_string();

    match state.gate.authorize(&path, &credentials).await {
        Ok(AccessDecision::Public) => next.run(request).await,
        Ok(AccessDecision::Granted(auth)) => {
            let jar = issue_cookies(&state, jar, &auth);
            request.extensions_mut().insert(auth);
            let response = next.run(request).await;
            (jar, response).into_response()
        }
        Ok(AccessDecision::Forbidden(auth)) => {
            let jar = issue_cookies(&state, jar, &auth);
            (jar, Redirect::to(&config.auth.access_denied_page)).into_response()
        }
        Err(e) if e.requires_login() || matches!(e, AuthError::SessionLimitReached(_)) => {
            debug!(path = %path, reason = %e, "Request requires authentication");

            let jar = if matches!(e, AuthError::TokenExpired | AuthError::TokenUnknown) {
                cookies::clear_remember_me(jar, config)
            } else {
                jar
            };

            if credentials.basic.is_some() && config.auth.http_basic {
                let mut response = (jar, StatusCode::UNAUTHORIZED).into_response();
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_CHALLENGE));
                return response;
            }

            (jar, Redirect::to(&config.auth.login_page)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Cookies for a session admitted while authenticating.
fn issue_cookies(state: &AppState, jar: CookieJar, auth: &Authentication) -> CookieJar {
    let AuthMethod::RememberMe { rotated } = &auth.method else {
        return jar;
    };

    let config = &state.config;
    let jar = match &auth.session {
        Some(session) => cookies::set_session(jar, config, session.id),
        None => jar,
    };
    match rotated {
        Some(token) => cookies::set_remember_me(jar, config, token, state.gate.remember_me().now()),
        None => jar,
    }
}
