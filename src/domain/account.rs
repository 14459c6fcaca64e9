//! Account and clinic records as seen by the authentication core.
//!
//! These records are owned by the persistence collaborator; the core only
//! reads them (plus a best-effort last-login touch). Emails are stored
//! lowercased and are unique within their clinic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of account roles.
///
/// Role checks match exhaustively on this enum; an unrecognized role string
/// cannot exist past deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full access across all clinics.
    Administrator,
    /// Manages staff and campaigns within one clinic.
    Manager,
    /// Front-desk operations within one clinic.
    Receptionist,
    /// Medical staff; limited to their own schedule.
    Clinician,
}

impl UserRole {
    /// Administrators bypass the tenant gate and pass every role gate.
    pub fn is_administrator(self) -> bool {
        matches!(self, UserRole::Administrator)
    }

    /// Wire representation, useful for log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Administrator => "ADMINISTRATOR",
            UserRole::Manager => "MANAGER",
            UserRole::Receptionist => "RECEPTIONIST",
            UserRole::Clinician => "CLINICIAN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clinic is the tenant boundary: accounts and data belong to exactly one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: String,
    pub name: String,
    #[serde(rename = "isActive")]
    pub active: bool,
}

/// An account record, scoped to one clinic.
///
/// The password hash and the external identity link never leave the process;
/// both are skipped on serialization so responses can embed the record as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub tenant_id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Subject identifier at the external identity provider, when linked.
    #[serde(skip_serializing)]
    pub external_id: Option<String>,
    #[serde(rename = "isActive")]
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub clinic: Clinic,
}

impl Account {
    /// An authentication attempt may only succeed when both the account and
    /// its owning clinic are active.
    pub fn is_usable(&self) -> bool {
        self.active && self.clinic.active
    }
}
