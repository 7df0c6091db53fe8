//! Shared test helpers for HTTP tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::{HeaderMap, Request, StatusCode};
use tower::ServiceExt;

use gatehouse_api::{AppState, build_router};
use gatehouse_auth::{Argon2Hasher, AuthenticationGate, InMemoryCredentialStore};
use gatehouse_core::config::AppConfig;
use gatehouse_core::events::EventPublisher;
use gatehouse_core::traits::ManualClock;
use gatehouse_core::types::Principal;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The gate behind the router
    pub gate: Arc<AuthenticationGate>,
    /// Clock driving session and token expiry
    pub clock: ManualClock,
}

/// Simplified response for assertions
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// The redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Value of a cookie set by this response. Removals yield `Some("")`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(n, _)| n.trim() == name)
            .map(|(_, value)| value.trim().to_string())
    }

    /// Raw `Set-Cookie` header for `name`.
    pub fn set_cookie_header(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{name}=")))
            .map(String::from)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }
}

impl TestApp {
    /// Create a test application with the default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with `alice` (USER) and `root` (USER, ADMIN)
    pub fn with_config(config: AppConfig) -> Self {
        let hasher = Argon2Hasher::with_params(8, 1, 1).expect("params");
        let store = InMemoryCredentialStore::new();
        store.insert(Principal::new(
            "alice",
            hasher.hash_password("correct-pw").expect("hash"),
            ["USER"],
        ));
        store.insert(Principal::new(
            "root",
            hasher.hash_password("root-pw").expect("hash"),
            ["USER", "ADMIN"],
        ));

        let clock = ManualClock::default();
        let gate = Arc::new(
            AuthenticationGate::from_config(
                &config,
                Arc::new(store),
                Arc::new(hasher),
                Arc::new(clock.clone()),
                EventPublisher::new(),
            )
            .expect("gate"),
        );

        let state = AppState::new(Arc::new(config), gate.clone());

        Self {
            router: build_router(state),
            gate,
            clock,
        }
    }

    /// Send a request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET `path` with an optional `Cookie` header
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("request")).await
    }

    /// POST the login form
    pub async fn login(&self, username: &str, password: &str, remember: bool) -> TestResponse {
        let mut form = format!("sbat-username={username}&sbat-password={password}");
        if remember {
            form.push_str("&remember-me=on");
        }

        let request = Request::builder()
            .method("POST")
            .uri("/sbat/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .expect("request");
        self.send(request).await
    }
}
