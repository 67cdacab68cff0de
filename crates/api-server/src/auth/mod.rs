//! Bearer-token identity resolution.
//!
//! This layer never authenticates credentials; an upstream issuer signs the
//! token and every handler trusts the verified `sub` claim as the owner
//! identity.

mod jwt;

use axum::http::HeaderMap;

pub use jwt::{issue_user_jwt, verify_user_jwt, UserJwtClaims};

/// The authenticated identity attached to a request
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: String,
}

/// Resolve the requesting user from the `Authorization: Bearer` header.
pub fn resolve_user_identity(headers: &HeaderMap) -> Result<UserIdentity, String> {
    let header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Expected a Bearer token".to_string())?;

    let claims = verify_user_jwt(token)?;
    Ok(UserIdentity {
        user_id: claims.sub,
    })
}
