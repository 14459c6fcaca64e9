//! Service configuration with startup security validation.
//!
//! Configuration is assembled once at process start from defaults, an
//! optional `clinic-auth.toml`, and `CLINIC_`-prefixed environment variables
//! (double underscore separates nesting, e.g. `CLINIC_AUTH__ACCESS_SECRET`).
//! It is never mutated afterwards.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Minimum signing secret length recommended for production.
pub const MIN_SECRET_LENGTH: usize = 32;

const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-this-in-production";
const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-this-in-production";

/// Deployment environment; controls error detail exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

/// Which authentication middleware variant this deployment runs.
///
/// The two variants are mutually exclusive deployment strategies, never
/// composed: either tokens are issued and verified locally, or verification
/// is delegated to an external identity provider and the verified subject is
/// re-resolved against the local account store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Local,
    External,
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
    /// Origin allowed by the CORS layer.
    pub frontend_origin: String,
    pub auth: AuthConfig,
}

/// Token signing and verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret for access tokens. Must differ from `refresh_secret` so a
    /// leaked access secret cannot forge long-lived refresh tokens.
    pub access_secret: String,
    /// Secret for refresh tokens.
    pub refresh_secret: String,
    /// Access token lifetime as a duration string (`15m`, `2h`, `1d`).
    pub access_expiry: String,
    /// Refresh token lifetime as a duration string.
    pub refresh_expiry: String,
    /// Issuer claim embedded in and required from every token.
    pub issuer: String,
    /// Audience claim embedded in and required from every token.
    pub audience: String,
    /// Tenant this deployment serves; external-identity resolution is scoped
    /// to it.
    pub tenant_id: String,
    pub mode: AuthMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            listen_addr: "127.0.0.1:3333".to_string(),
            frontend_origin: "http://localhost:3000".to_string(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: DEV_ACCESS_SECRET.to_string(),
            refresh_secret: DEV_REFRESH_SECRET.to_string(),
            access_expiry: "15m".to_string(),
            refresh_expiry: "7d".to_string(),
            issuer: "clinic-auth".to_string(),
            audience: "clinic-auth-users".to_string(),
            tenant_id: "default".to_string(),
            mode: AuthMode::Local,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, `clinic-auth.toml`, and environment.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("clinic-auth.toml"))
            .merge(Env::prefixed("CLINIC_").split("__"))
            .extract()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Validate the configuration for production use.
    ///
    /// Returns warnings for insecure settings; call at startup so operators
    /// see them before the first request.
    pub fn validate_for_production(&self) -> Vec<SecurityWarning> {
        let mut warnings = Vec::new();
        let auth = &self.auth;

        if auth.access_secret == DEV_ACCESS_SECRET || auth.refresh_secret == DEV_REFRESH_SECRET {
            warnings.push(SecurityWarning {
                code: "DEFAULT_SIGNING_SECRET",
                message: "Using a default signing secret. Set CLINIC_AUTH__ACCESS_SECRET \
                          and CLINIC_AUTH__REFRESH_SECRET."
                    .to_string(),
                severity: WarningSeverity::Critical,
            });
        }

        if auth.access_secret == auth.refresh_secret {
            warnings.push(SecurityWarning {
                code: "SHARED_SIGNING_SECRET",
                message: "Access and refresh tokens share one secret; a leaked access \
                          secret can forge refresh tokens."
                    .to_string(),
                severity: WarningSeverity::Critical,
            });
        }

        for (name, secret) in [
            ("access_secret", &auth.access_secret),
            ("refresh_secret", &auth.refresh_secret),
        ] {
            if secret.len() < MIN_SECRET_LENGTH {
                warnings.push(SecurityWarning {
                    code: "SIGNING_SECRET_TOO_SHORT",
                    message: format!(
                        "{name} is {} bytes, minimum {MIN_SECRET_LENGTH} recommended",
                        secret.len()
                    ),
                    severity: WarningSeverity::High,
                });
            }
        }

        warnings
    }

    /// Log all security warnings at startup.
    pub fn log_security_warnings(&self) {
        for warning in self.validate_for_production() {
            match warning.severity {
                WarningSeverity::Critical => {
                    tracing::error!("[SECURITY] {}: {}", warning.code, warning.message);
                }
                WarningSeverity::High => {
                    tracing::warn!("[SECURITY] {}: {}", warning.code, warning.message);
                }
            }
        }
    }
}

/// Security warning from configuration validation.
#[derive(Debug, Clone)]
pub struct SecurityWarning {
    pub code: &'static str,
    pub message: String,
    pub severity: WarningSeverity,
}

/// Warning severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    /// Should not run in production.
    Critical,
    /// Significant security risk.
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_warn_about_dev_secrets() {
        let config = AppConfig::default();
        let warnings = config.validate_for_production();
        assert!(
            warnings.iter().any(|w| w.code == "DEFAULT_SIGNING_SECRET"),
            "expected default-secret warning"
        );
    }

    #[test]
    fn shared_secret_is_flagged() {
        let mut config = AppConfig::default();
        config.auth.access_secret = "a".repeat(MIN_SECRET_LENGTH);
        config.auth.refresh_secret = config.auth.access_secret.clone();

        let warnings = config.validate_for_production();
        assert!(warnings.iter().any(|w| w.code == "SHARED_SIGNING_SECRET"));
    }

    #[test]
    fn distinct_long_secrets_pass_clean() {
        let mut config = AppConfig::default();
        config.auth.access_secret = "a".repeat(MIN_SECRET_LENGTH);
        config.auth.refresh_secret = "b".repeat(MIN_SECRET_LENGTH);

        assert!(config.validate_for_production().is_empty());
    }

    #[test]
    fn short_secret_is_flagged() {
        let mut config = AppConfig::default();
        config.auth.access_secret = "short".to_string();
        config.auth.refresh_secret = "b".repeat(MIN_SECRET_LENGTH);

        let warnings = config.validate_for_production();
        assert!(
            warnings
                .iter()
                .any(|w| w.code == "SIGNING_SECRET_TOO_SHORT")
        );
    }
}
