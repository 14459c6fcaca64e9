//! Token claims and the request-scoped identity context.
//!
//! `Claims` is the signed token payload; it is immutable once issued and is
//! never persisted. `CurrentUser` is what actually travels through request
//! extensions: both authentication variants produce one, so the authorization
//! gates and handlers never care which variant ran.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::domain::account::{Account, UserRole};
use crate::domain::error::AuthError;

/// Signed token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id).
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    /// Build claims for an account, expiring `ttl_secs` from now.
    pub fn new(account: &Account, issuer: &str, audience: &str, ttl_secs: u64) -> Self {
        let now = unix_now();
        Self {
            sub: account.id.clone(),
            email: account.email.clone(),
            role: account.role,
            tenant_id: account.tenant_id.clone(),
            iat: now,
            exp: now + ttl_secs,
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Verified identity attached to a request by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub tenant_id: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            tenant_id: claims.tenant_id,
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::NotAuthenticated)
    }
}

/// Extractor for endpoints that behave differently for anonymous callers.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}
