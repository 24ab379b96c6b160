// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{AppError, AuthError},
    utils::access::{Capability, Principal, Role, authorize},
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    pub username: String,
    /// User's role ('user' or 'admin').
    pub role: String,
    /// Issued-at as Unix timestamp.
    pub iat: usize,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

fn now_secs() -> Result<usize, AppError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Signs a new JWT for the principal, valid for `expiration_seconds`.
pub fn sign_jwt(
    principal: &Principal,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let now = now_secs()?;
    let exp = usize::try_from(expiration_seconds)
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .ok_or_else(|| AppError::Internal("Token expiration out of range".to_string()))?;

    let claims = Claims {
        sub: principal.user_id.to_string(),
        username: principal.username.clone(),
        role: principal.role.as_str().to_owned(),
        iat: now,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

/// Verifies a bearer token and resolves it to a `Principal`.
///
/// Stateless: only the signature, the validity window and the shape of the
/// claims are checked.
pub fn authenticate(token: Option<&str>, secret: &str) -> Result<Principal, AuthError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Invalid,
    })?;

    let claims = token_data.claims;
    let user_id = claims.sub.parse::<i64>().map_err(|_| AuthError::Invalid)?;
    let role = claims.role.parse::<Role>().map_err(|_| AuthError::Invalid)?;

    Ok(Principal {
        user_id,
        username: claims.username,
        role,
    })
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
fn bearer_token(value: Option<&str>) -> Option<&str> {
    value.and_then(|v| v.strip_prefix("Bearer "))
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and injects the
/// resolved `Principal` into the request extensions.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let principal = authenticate(bearer_token(header_value), &config.jwt_secret).map_err(|e| {
        tracing::debug!("Rejected request: {}", e);
        e
    })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Axum Middleware: Authorization.
///
/// Must run AFTER `auth_middleware`. Rejects with 403 before the handler reads
/// the body or touches storage.
pub async fn require_capability(
    capability: Capability,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or(AuthError::MissingToken)?;

    authorize(principal, capability)?;

    Ok(next.run(req).await)
}
