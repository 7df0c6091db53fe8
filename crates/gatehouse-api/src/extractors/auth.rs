//! `CurrentUser` extractor — exposes the authentication established by the access middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gatehouse_auth::{AuthError, Authentication};

use crate::error::ApiError;

/// The authenticated principal of the current request.
///
/// Only present on paths the access middleware authenticated; public paths
/// are never authenticated and reject this extractor.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Authentication);

impl std::ops::Deref for CurrentUser {
    type Target = Authentication;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authentication>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }
}
