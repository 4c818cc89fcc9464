use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use super::{claims::AuthenticatedUser, jwt::JwtKeys};
use crate::error::{ApiError, ServiceError};

const BEARER_SCHEME: &str = "Bearer";

/// Authorization gate shared by both transports. Takes the raw
/// `Authorization` header value; every failure collapses to `Unauthorized`.
pub fn authorize(header: Option<&str>, keys: &JwtKeys) -> Result<AuthenticatedUser, ServiceError> {
    let Some(header) = header else {
        debug!("missing Authorization header");
        return Err(ServiceError::Unauthorized);
    };

    // Exactly "Bearer <token>".
    let token = match header.split(' ').collect::<Vec<_>>().as_slice() {
        [scheme, token] if *scheme == BEARER_SCHEME && !token.is_empty() => *token,
        _ => {
            debug!("invalid Authorization header format");
            return Err(ServiceError::Unauthorized);
        }
    };

    keys.verify(token).map_err(|e| {
        debug!(reason = %e, "token rejected");
        ServiceError::Unauthorized
    })
}

/// Extracts and validates the bearer token, yielding the caller's identity.
pub struct AuthUser(pub AuthenticatedUser);

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
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let user = authorize(header, &keys)?;
        Ok(AuthUser(user))
    }
}
