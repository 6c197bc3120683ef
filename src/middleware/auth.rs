use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use validator::Validate;

use crate::error::Error;
use crate::models::principal::Principal;
use crate::utils::token::decode_session_token;
use crate::AppState;

pub const SESSION_COOKIE: &str = "appSession";

/// Reads the session token, if any, and stores the caller's `Principal` in
/// request extensions. Never rejects; routes opt into authentication through
/// the [`Authenticated`] extractor.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let principal = session_token(req.headers())
        .and_then(|token| decode_session_token(&state.session_secret, &token))
        .filter(|principal| principal.validate().is_ok());

    if let Some(principal) = principal {
        if let Err(err) = state.user_service.ensure_user(&principal).await {
            tracing::warn!(sub = %principal.sub, error = %err, "could not ensure user record");
        }
        req.extensions_mut().insert(principal);
    }

    next.run(req).await
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            return Some(token.trim().to_string());
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Route guard: resolves to the session's principal or answers 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| Error::Unauthorized("Not Authorized".to_string()))
    }
}

/// Optional form of [`Authenticated`] for routes open to anonymous callers.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Principal>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthenticated
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthenticated(parts.extensions.get::<Principal>().cloned()))
    }
}
