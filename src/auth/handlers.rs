//! Login, refresh, me, and logout flows.
//!
//! The flow controller orchestrates the credential verifier, the token
//! service, and the account store. Unknown email and wrong password produce
//! the same response so callers cannot enumerate accounts. The last-login
//! touch is best-effort: a persistence hiccup there never fails a login that
//! already succeeded.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use super::claims::{CurrentUser, MaybeUser};
use super::password::verify_password;
use crate::domain::account::Account;
use crate::domain::error::{AuthError, Result};
use crate::server::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: Account,
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    pub code: &'static str,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(body) = payload.map_err(|e| AuthError::validation(e.body_text()))?;
    body.validate().map_err(validation_error)?;

    let email = body.email.trim().to_lowercase();
    info!("login attempt for: {email}");

    let Some(account) = state.store.find_by_email(&email).await? else {
        warn!("login attempt for unknown email: {email}");
        return Err(AuthError::InvalidCredentials);
    };

    if !account.active {
        warn!("login attempt for inactive user: {email}");
        return Err(AuthError::UserInactive);
    }
    if !account.clinic.active {
        warn!("login attempt against inactive clinic: {email}");
        return Err(AuthError::ClinicInactive);
    }

    if !verify_password(&body.password, &account.password_hash) {
        warn!("login attempt with wrong password: {email}");
        return Err(AuthError::InvalidCredentials);
    }

    let token = state.tokens.issue_access(&account)?;
    let refresh_token = state.tokens.issue_refresh(&account)?;

    // Best-effort: the login already succeeded.
    if let Err(err) = state.store.record_login(&account.id).await {
        warn!("failed to record last login for {email}: {err}");
    }

    info!("login succeeded for: {email}");
    Ok(Json(LoginResponse {
        user: account,
        token,
        refresh_token,
        expires_in: state.tokens.expiry_seconds(),
    }))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>> {
    let Json(body) = payload.map_err(|e| AuthError::validation(e.body_text()))?;
    body.validate().map_err(validation_error)?;

    let claims = state
        .tokens
        .verify_refresh(&body.refresh_token)
        .map_err(|err| match err {
            AuthError::Internal(_) => err,
            _ => AuthError::InvalidRefreshToken,
        })?;

    // Claims may be stale: re-check both active flags against the store.
    let account = state
        .store
        .find_by_id(&claims.sub)
        .await?
        .filter(Account::is_usable)
        .ok_or(AuthError::UserOrClinicInactive)?;

    let token = state.tokens.issue_access(&account)?;
    info!("access token refreshed for: {}", account.email);

    Ok(Json(RefreshResponse {
        token,
        expires_in: state.tokens.expiry_seconds(),
    }))
}

/// GET /api/auth/me
///
/// Claims are trusted only for identity; everything else is re-fetched so a
/// role or active-flag change since issuance is reflected immediately.
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Account>> {
    let account = state
        .store
        .find_by_id(&user.id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(account))
}

/// POST /api/auth/logout
///
/// Stateless by design: no token store exists, so nothing is invalidated
/// server-side. Tokens remain valid until their expiry instant; the client
/// discards them.
pub async fn logout(MaybeUser(user): MaybeUser) -> Json<MessageResponse> {
    if let Some(user) = user {
        info!("logout: {}", user.email);
    }

    Json(MessageResponse {
        message: "Logout successful",
        code: "LOGOUT_SUCCESS",
    })
}

/// Collapse field-level validation failures into one 400 message.
fn validation_error(errors: ValidationErrors) -> AuthError {
    let mut parts: Vec<String> = Vec::new();
    for (field, failures) in errors.field_errors() {
        for failure in failures {
            let detail = failure
                .message
                .as_ref()
                .map_or_else(|| failure.code.to_string(), ToString::to_string);
            parts.push(format!("{field}: {detail}"));
        }
    }
    parts.sort();
    AuthError::Validation(parts.join("; "))
}
