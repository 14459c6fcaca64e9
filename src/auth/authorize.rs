//! Role and tenant gates, layered after authentication.
//!
//! Both gates read the identity the authentication middleware attached; a
//! request that never passed authentication fails `NOT_AUTHENTICATED` rather
//! than panicking on a missing extension.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{RawPathParams, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::claims::CurrentUser;
use crate::domain::account::UserRole;
use crate::domain::error::{AuthError, Result};

/// Gate admitting only the listed roles.
///
/// Use with `axum::middleware::from_fn`:
///
/// ```ignore
/// router.route_layer(middleware::from_fn(require_roles(&[UserRole::Administrator])))
/// ```
pub fn require_roles(
    allowed: &'static [UserRole],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response>> + Send>> + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = current_user(&req)?;
            if !allowed.contains(&user.role) {
                warn!(
                    "access denied for {} with role {}; allowed: {:?}",
                    user.email, user.role, allowed
                );
                return Err(AuthError::InsufficientPermissions {
                    required: allowed.to_vec(),
                    actual: user.role,
                });
            }
            Ok(next.run(req).await)
        })
    }
}

/// Gate rejecting cross-clinic access.
///
/// The target clinic is taken from the `tenant_id` path parameter; handlers
/// with body-supplied targets call [`ensure_tenant`] directly. Administrators
/// bypass the check, and a request that names no target clinic is admitted.
pub async fn require_same_tenant(
    params: RawPathParams,
    req: Request,
    next: Next,
) -> Result<Response> {
    let user = current_user(&req)?;
    let target = params
        .iter()
        .find(|(name, _)| *name == "tenant_id")
        .map(|(_, value)| value);

    ensure_tenant(&user, target)?;
    Ok(next.run(req).await)
}

/// Check whether `user` may act on `target` clinic data.
pub fn ensure_tenant(user: &CurrentUser, target: Option<&str>) -> Result<()> {
    if user.role.is_administrator() {
        return Ok(());
    }

    match target {
        Some(tenant_id) if tenant_id != user.tenant_id => {
            warn!(
                "cross-tenant access attempt: {} targeting clinic {tenant_id}",
                user.email
            );
            Err(AuthError::CrossTenantAccessDenied)
        }
        _ => Ok(()),
    }
}

fn current_user(req: &Request) -> Result<CurrentUser> {
    req.extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AuthError::NotAuthenticated)
}
