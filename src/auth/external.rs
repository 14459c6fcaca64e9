//! External-identity-provider authentication variant.
//!
//! Deployment alternative to the local-token middleware, never composed with
//! it: token verification is delegated to an external provider, after which
//! the verified subject is re-resolved against the local account store. Role,
//! tenant, and active flags are authoritative only from the local record;
//! whatever the external token payload claims about them is ignored. Only
//! the provider-verified email is merged in.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use super::claims::CurrentUser;
use super::token::TokenService;
use crate::domain::account::Account;
use crate::domain::error::{AuthError, Result};
use crate::server::AppState;

/// Identity verified by the external provider.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    /// Subject identifier at the provider.
    pub subject: String,
    /// Email the provider has verified.
    pub email: String,
}

/// External identity provider collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer token with the provider and return the identity it
    /// attests to. Any verification failure maps to an invalid token.
    async fn verify_token(&self, token: &str) -> Result<ExternalIdentity>;
}

/// Reject the request unless the external provider verifies the token and an
/// active, linked local account exists in the deployment's clinic.
pub async fn require_external_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let provider = state.identity.clone().ok_or_else(|| {
        AuthError::internal("external auth mode without a configured identity provider")
    })?;

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::NoToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;
    let token = TokenService::extract_bearer(header)?;

    let identity = match provider.verify_token(token).await {
        Ok(identity) => identity,
        Err(err) => {
            warn!("external identity verification failed: {err}");
            return Err(AuthError::InvalidToken);
        }
    };

    let tenant_id = &state.config.auth.tenant_id;
    let account = state
        .store
        .find_by_external_id(&identity.subject, tenant_id)
        .await?
        .filter(Account::is_usable);

    let Some(account) = account else {
        warn!(
            "externally verified identity {} has no active linked account",
            identity.email
        );
        return Err(AuthError::AccountNotLinked);
    };

    info!("authenticated user via external provider: {}", identity.email);

    // Locally sourced role/tenant; provider-verified email.
    req.extensions_mut().insert(CurrentUser {
        id: account.id,
        email: identity.email,
        role: account.role,
        tenant_id: account.tenant_id,
    });

    Ok(next.run(req).await)
}
