use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Resolves the acting identity from `Authorization: Bearer <token>`.
///
/// A request with no usable header is rejected with 401, while a request
/// that presents a token failing verification is rejected with 403. The
/// split is a stable part of the wire contract and must not be unified.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Нет доступа".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Нет доступа".into()))?;

        let claims = keys.verify(token).ok_or_else(|| {
            warn!("token failed verification");
            ApiError::Forbidden("Доступ запрещен".into())
        })?;

        Ok(AuthUser(claims.sub))
    }
}
