//! Local-token authentication middleware.
//!
//! Per-request pipeline: no header fails `NO_TOKEN`; a non-Bearer scheme
//! fails like an invalid token; signature/issuer/audience mismatches fail
//! `INVALID_TOKEN`; a past expiry fails `TOKEN_EXPIRED`. On success the
//! verified identity is attached to request extensions for the gates and
//! handlers downstream.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use super::claims::CurrentUser;
use super::token::TokenService;
use crate::domain::error::{AuthError, Result};
use crate::server::AppState;

/// Reject the request unless it carries a valid locally issued access token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    match authenticate(&state, req.headers()) {
        Ok(user) => {
            info!("authenticated user: {}", user.email);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(err) => {
            warn!("rejected request with invalid credentials: {err}");
            Err(err)
        }
    }
}

/// Run the same parse/verify pipeline but proceed anonymously on any
/// failure. For endpoints that behave differently for anonymous callers.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Ok(user) = authenticate(&state, req.headers()) {
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}

/// Extract and verify the bearer access token from request headers.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::NoToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let token = TokenService::extract_bearer(header)?;
    let claims = state.tokens.verify_access(token)?;
    Ok(CurrentUser::from(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::account::{Account, Clinic, UserRole};
    use crate::server::AppState;
    use crate::store::MemoryAccountStore;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Arc::new(MemoryAccountStore::new()), None)
    }

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: "u1".to_string(),
            tenant_id: "t1".to_string(),
            email: "a@b.com".to_string(),
            name: "Test".to_string(),
            phone: None,
            role: UserRole::Clinician,
            password_hash: String::new(),
            external_id: None,
            active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            clinic: Clinic {
                id: "t1".to_string(),
                name: "Clinic".to_string(),
                active: true,
            },
        }
    }

    #[test]
    fn missing_header_fails_no_token() {
        let headers = HeaderMap::new();
        assert_eq!(
            authenticate(&state(), &headers).unwrap_err(),
            AuthError::NoToken
        );
    }

    #[test]
    fn wrong_scheme_fails_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(
            authenticate(&state(), &headers).unwrap_err(),
            AuthError::MalformedHeader
        );
    }

    #[test]
    fn garbage_token_fails_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer not.a.jwt"),
        );
        assert_eq!(
            authenticate(&state(), &headers).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn valid_token_yields_current_user() {
        let state = state();
        let token = state.tokens.issue_access(&account()).expect("issue");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );

        let user = authenticate(&state, &headers).expect("authenticate");
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, UserRole::Clinician);
    }
}
