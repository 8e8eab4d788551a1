use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::jwt::JwtVerifier;
use crate::auth::models::AuthenticatedUser;
use crate::error::AppError;

/// Caller identity extracted from the `Authorization: Bearer` header.
///
/// A request without the header yields `CallerIdentity(None)`; the document
/// service then answers `Unauthenticated`. A header that is present but
/// malformed or carries an invalid token is rejected here.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Option<AuthenticatedUser>);

impl CallerIdentity {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.0.as_ref()
    }
}

/// Pull the raw token out of an `Authorization` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
    Arc<JwtVerifier>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CallerIdentity(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(bearer_token)
            .ok_or_else(|| AppError::Unauthenticated("Malformed Authorization header".into()))?;

        let verifier = Arc::<JwtVerifier>::from_ref(state);
        let user = verifier.verify(token)?;
        tracing::debug!(user_id = %user.user_id, "resolved caller identity");

        Ok(CallerIdentity(Some(user)))
    }
}
