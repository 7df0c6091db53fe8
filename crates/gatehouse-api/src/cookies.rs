//! Mapping between gate credentials and HTTP cookies and headers.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::{Authorization, HeaderMapExt};
use chrono::{DateTime, Utc};

use gatehouse_auth::{Credentials, RememberMeToken};
use gatehouse_core::config::AppConfig;
use gatehouse_core::types::SessionId;

/// Extracts every credential a request carries.
///
/// Unparseable session cookies are treated as absent.
pub fn credentials(config: &AppConfig, jar: &CookieJar, headers: &HeaderMap) -> Credentials {
    Credentials {
        session_id: session_id(config, jar),
        basic: headers
            .typed_get::<Authorization<Basic>>()
            .map(|Authorization(basic)| (basic.username().to_string(), basic.password().to_string())),
        remember_me: remember_me_value(config, jar),
    }
}

/// The session id from the session cookie.
pub fn session_id(config: &AppConfig, jar: &CookieJar) -> Option<SessionId> {
    jar.get(&config.session.cookie_name)
        .and_then(|cookie| cookie.value().parse().ok())
}

/// The raw remember-me token value.
pub fn remember_me_value(config: &AppConfig, jar: &CookieJar) -> Option<String> {
    jar.get(&config.remember_me.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether a form value asks for a persistent login.
pub fn remember_me_requested(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        ["true", "on", "yes", "1"]
            .iter()
            .any(|accepted| v.trim().eq_ignore_ascii_case(accepted))
    })
}

/// Adds the session cookie. It has no `Max-Age`, so it ends with the browser session.
pub fn set_session(jar: CookieJar, config: &AppConfig, id: SessionId) -> CookieJar {
    jar.add(
        Cookie::build((config.session.cookie_name.clone(), id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Adds the persistent remember-me cookie, expiring with the token.
pub fn set_remember_me(
    jar: CookieJar,
    config: &AppConfig,
    token: &RememberMeToken,
    now: DateTime<Utc>,
) -> CookieJar {
    jar.add(
        Cookie::build((config.remember_me.cookie_name.clone(), token.value.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(token.max_age_seconds(now))),
    )
}

/// Expires the session cookie.
pub fn clear_session(jar: CookieJar, config: &AppConfig) -> CookieJar {
    jar.remove(Cookie::build((config.session.cookie_name.clone(), "")).path("/"))
}

/// Expires the remember-me cookie.
pub fn clear_remember_me(jar: CookieJar, config: &AppConfig) -> CookieJar {
    jar.remove(Cookie::build((config.remember_me.cookie_name.clone(), "")).path("/"))
}
