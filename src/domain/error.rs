//! Closed error taxonomy for the authentication core, with Axum integration.
//!
//! Every failure the core can produce is a variant here and is translated to
//! an HTTP status plus a machine-readable code at this boundary. Validation
//! and auth failures are terminal per request; only `Internal` represents the
//! unexpected (persistence outage, signing failure) and maps to 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::account::UserRole;

/// Result type alias for operations inside the authentication core.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Authentication and authorization errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid request data: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is inactive. Contact your administrator.")]
    UserInactive,

    #[error("Clinic is inactive. Contact support.")]
    ClinicInactive,

    #[error("User or clinic is inactive")]
    UserOrClinicInactive,

    #[error("Access token required")]
    NoToken,

    #[error("Missing or malformed Bearer authorization header")]
    MalformedHeader,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("No active account is linked to this identity")]
    AccountNotLinked,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Access denied. Insufficient permissions.")]
    InsufficientPermissions {
        required: Vec<UserRole>,
        actual: UserRole,
    },

    #[error("Access denied. You can only access data from your own clinic.")]
    CrossTenantAccessDenied,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Create a validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::UserInactive
            | AuthError::ClinicInactive
            | AuthError::UserOrClinicInactive
            | AuthError::NoToken
            | AuthError::MalformedHeader
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::InvalidRefreshToken
            | AuthError::AccountNotLinked
            | AuthError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions { .. } | AuthError::CrossTenantAccessDenied => {
                StatusCode::FORBIDDEN
            }
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code for clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::UserInactive => "USER_INACTIVE",
            AuthError::ClinicInactive => "CLINIC_INACTIVE",
            AuthError::UserOrClinicInactive => "USER_OR_CLINIC_INACTIVE",
            AuthError::NoToken => "NO_TOKEN",
            // Malformed Authorization headers surface the same way a bad
            // token does, so clients get no extra parsing signal.
            AuthError::MalformedHeader | AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::ExpiredToken => "TOKEN_EXPIRED",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::AccountNotLinked => "ACCOUNT_NOT_LINKED",
            AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
            AuthError::InsufficientPermissions { .. } => "INSUFFICIENT_PERMISSIONS",
            AuthError::CrossTenantAccessDenied => "CROSS_TENANT_ACCESS_DENIED",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return from a production deployment.
    pub fn sanitized_message(&self) -> String {
        match self {
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Raw internal detail is only exposed in debug builds; production
        // deployments always get the sanitized message.
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let mut body = serde_json::json!({
            "error": message,
            "code": code,
        });

        if let AuthError::InsufficientPermissions { required, actual } = &self {
            body["requiredRoles"] = serde_json::json!(required);
            body["userRole"] = serde_json::json!(actual);
        }

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            AuthError::validation("bad shape").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::ExpiredToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::CrossTenantAccessDenied.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::internal("db down").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn malformed_header_is_indistinguishable_from_invalid_token() {
        assert_eq!(
            AuthError::MalformedHeader.error_code(),
            AuthError::InvalidToken.error_code()
        );
        assert_eq!(
            AuthError::MalformedHeader.status_code(),
            AuthError::InvalidToken.status_code()
        );
    }

    #[test]
    fn internal_detail_is_sanitized() {
        let err = AuthError::internal("connection refused on 10.0.0.3:5432");
        assert_eq!(err.sanitized_message(), "Internal server error");
        // Auth failures carry static, client-safe messages.
        assert_eq!(
            AuthError::InvalidCredentials.sanitized_message(),
            "Invalid credentials"
        );
    }

    #[test]
    fn permission_denial_lists_required_roles() {
        let err = AuthError::InsufficientPermissions {
            required: vec![UserRole::Administrator, UserRole::Manager],
            actual: UserRole::Clinician,
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_PERMISSIONS");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
