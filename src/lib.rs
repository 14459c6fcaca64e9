//! Clinic Auth - multi-tenant authentication and authorization service.
//!
//! Issues and verifies signed access/refresh token pairs and enforces role
//! and clinic (tenant) isolation through a layered middleware pipeline:
//! authenticate, authorize, handle. Persistence is an injected collaborator;
//! no session or revocation state exists server-side.

pub mod auth;
pub mod config;
pub mod domain;
pub mod server;
pub mod store;

pub use auth::{Claims, CurrentUser, TokenService};
pub use config::{AppConfig, AuthConfig, AuthMode, Environment};
pub use domain::{Account, AuthError, Clinic, UserRole};
pub use server::AppState;
pub use store::{AccountStore, MemoryAccountStore};
