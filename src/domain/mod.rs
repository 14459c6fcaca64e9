//! Domain types shared across the authentication core.

pub mod account;
pub mod error;

pub use account::{Account, Clinic, UserRole};
pub use error::{AuthError, Result};
