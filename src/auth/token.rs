//! Signed access and refresh token issuance and verification.
//!
//! Access and refresh tokens are independently signed HS256 JWTs with
//! distinct secrets, so compromise of one class cannot forge the other. Only
//! the configured algorithm is accepted on decode, and issuer and audience
//! are always enforced. Verification is a pure computation; the service is
//! shared immutably across requests.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

use super::claims::Claims;
use crate::config::AuthConfig;
use crate::domain::account::Account;
use crate::domain::error::{AuthError, Result};

/// Fallback access token lifetime when the configured duration is
/// unparseable: 15 minutes.
pub const DEFAULT_ACCESS_EXPIRY_SECS: u64 = 900;

/// Fallback refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Issues and verifies the two token classes.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_expiry: String,
    refresh_expiry: String,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_expiry: config.access_expiry.clone(),
            refresh_expiry: config.refresh_expiry.clone(),
        }
    }

    /// Issue a short-lived access token for an account.
    pub fn issue_access(&self, account: &Account) -> Result<String> {
        let claims = Claims::new(account, &self.issuer, &self.audience, self.expiry_seconds());
        self.sign(&claims, &self.access_encoding)
    }

    /// Issue a long-lived refresh token for an account.
    pub fn issue_refresh(&self, account: &Account) -> Result<String> {
        let ttl = parse_duration_secs(&self.refresh_expiry).unwrap_or(DEFAULT_REFRESH_EXPIRY_SECS);
        let claims = Claims::new(account, &self.issuer, &self.audience, ttl);
        self.sign(&claims, &self.refresh_encoding)
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> Result<Claims> {
        self.verify(token, &self.access_decoding)
    }

    /// Verify a refresh token and return its claims.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims> {
        self.verify(token, &self.refresh_decoding)
    }

    /// Access token lifetime in seconds, as told to clients.
    ///
    /// Parses the configured duration string; anything unrecognized falls
    /// back to 900 seconds.
    pub fn expiry_seconds(&self) -> u64 {
        parse_duration_secs(&self.access_expiry).unwrap_or(DEFAULT_ACCESS_EXPIRY_SECS)
    }

    /// Pull the token out of an `Authorization: Bearer <token>` header value.
    pub fn extract_bearer(header: &str) -> Result<&str> {
        header
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MalformedHeader)
    }

    fn sign(&self, claims: &Claims, key: &EncodingKey) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, key)
            .map_err(|e| AuthError::internal(format!("Token signing failed: {e}")))
    }

    fn verify(&self, token: &str, key: &DecodingKey) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        Ok(data.claims)
    }
}

/// Parse a duration string with an `m`/`h`/`d` suffix into seconds.
fn parse_duration_secs(value: &str) -> Option<u64> {
    let secs_per_unit = [("m", 60), ("h", 60 * 60), ("d", 24 * 60 * 60)];
    secs_per_unit.iter().find_map(|(unit, secs)| {
        let number: u64 = value.strip_suffix(unit)?.parse().ok()?;
        Some(number * secs)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::unix_now;
    use crate::domain::account::{Clinic, UserRole};
    use chrono::Utc;

    fn config() -> AuthConfig {
        AuthConfig {
            access_secret: "test-access-secret-0123456789abcdef".to_string(),
            refresh_secret: "test-refresh-secret-0123456789abcdef".to_string(),
            ..AuthConfig::default()
        }
    }

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: "u1".to_string(),
            tenant_id: "t1".to_string(),
            email: "a@b.com".to_string(),
            name: "Test".to_string(),
            phone: None,
            role: UserRole::Manager,
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
    fn access_token_round_trips_claims() {
        let service = TokenService::new(&config());
        let token = service.issue_access(&account()).expect("issue");
        let claims = service.verify_access(&token).expect("verify");

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, UserRole::Manager);
        assert_eq!(claims.tenant_id, "t1");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn refresh_token_round_trips_claims() {
        let service = TokenService::new(&config());
        let token = service.issue_refresh(&account()).expect("issue");
        let claims = service.verify_refresh(&token).expect("verify");

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.exp - claims.iat, DEFAULT_REFRESH_EXPIRY_SECS);
    }

    #[test]
    fn token_classes_reject_each_other() {
        let service = TokenService::new(&config());
        let access = service.issue_access(&account()).expect("issue");
        let refresh = service.issue_refresh(&account()).expect("issue");

        assert_eq!(
            service.verify_access(&refresh),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            service.verify_refresh(&access),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn expired_token_fails_with_expired_not_invalid() {
        let service = TokenService::new(&config());
        let mut claims = Claims::new(&account(), "clinic-auth", "clinic-auth-users", 0);
        claims.iat = unix_now() - 120;
        claims.exp = unix_now() - 1;

        let token = service.sign(&claims, &service.access_encoding).expect("sign");
        assert_eq!(service.verify_access(&token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn token_is_valid_right_up_to_expiry() {
        let service = TokenService::new(&config());
        let mut claims = Claims::new(&account(), "clinic-auth", "clinic-auth-users", 0);
        claims.exp = unix_now() + 5;

        let token = service.sign(&claims, &service.access_encoding).expect("sign");
        assert!(service.verify_access(&token).is_ok());
    }

    #[test]
    fn wrong_issuer_or_audience_is_rejected() {
        let service = TokenService::new(&config());

        let mut other = config();
        other.issuer = "someone-else".to_string();
        let foreign = TokenService::new(&other);
        let token = foreign.issue_access(&account()).expect("issue");
        assert_eq!(service.verify_access(&token), Err(AuthError::InvalidToken));

        let mut other = config();
        other.audience = "someone-else-users".to_string();
        let foreign = TokenService::new(&other);
        let token = foreign.issue_access(&account()).expect("issue");
        assert_eq!(service.verify_access(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let service = TokenService::new(&config());
        let mut other = config();
        other.access_secret = "a-completely-different-secret-value".to_string();
        let foreign = TokenService::new(&other);

        let token = foreign.issue_access(&account()).expect("issue");
        assert_eq!(service.verify_access(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn bearer_extraction_is_strict() {
        assert_eq!(TokenService::extract_bearer("Bearer abc"), Ok("abc"));
        assert_eq!(
            TokenService::extract_bearer("bearer abc"),
            Err(AuthError::MalformedHeader)
        );
        assert_eq!(
            TokenService::extract_bearer("Basic abc"),
            Err(AuthError::MalformedHeader)
        );
        assert_eq!(
            TokenService::extract_bearer("Bearer "),
            Err(AuthError::MalformedHeader)
        );
        assert_eq!(
            TokenService::extract_bearer("abc"),
            Err(AuthError::MalformedHeader)
        );
    }

    #[test]
    fn expiry_seconds_parses_known_suffixes() {
        let mut cfg = config();
        for (expiry, expected) in [
            ("15m", 900),
            ("2h", 7_200),
            ("1d", 86_400),
            ("7d", 604_800),
            ("", DEFAULT_ACCESS_EXPIRY_SECS),
            ("soon", DEFAULT_ACCESS_EXPIRY_SECS),
            ("15", DEFAULT_ACCESS_EXPIRY_SECS),
            // Unrecognized suffixes fall back even when multi-byte.
            ("15µ", DEFAULT_ACCESS_EXPIRY_SECS),
            ("15分", DEFAULT_ACCESS_EXPIRY_SECS),
        ] {
            cfg.access_expiry = expiry.to_string();
            assert_eq!(TokenService::new(&cfg).expiry_seconds(), expected, "{expiry}");
        }
    }
}
