use super::jwt::JwtClaims;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Owner identity of the authenticated caller.
///
/// Reads the claims left by [`super::jwt_auth_middleware`]; a route mounted
/// without the middleware answers 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JwtClaims>()
            .filter(|claims| !claims.sub.is_empty())
            .map(|claims| AuthUser(claims.sub.clone()))
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    }
}
