//! Authentication and authorization core.
//!
//! - `password` - credential verification (bcrypt)
//! - `token` - signed access/refresh token issuance and verification
//! - `claims` - token payload and request-scoped identity context
//! - `middleware` - local-token authentication (strict and optional modes)
//! - `external` - external-identity-provider authentication variant
//! - `authorize` - role and tenant gates
//! - `handlers` / `routes` - the login/refresh/me/logout flows

pub mod authorize;
pub mod claims;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod token;

pub use authorize::{ensure_tenant, require_roles, require_same_tenant};
pub use claims::{Claims, CurrentUser, MaybeUser};
pub use external::{ExternalIdentity, IdentityProvider};
pub use middleware::{optional_auth, require_auth};
pub use token::TokenService;
