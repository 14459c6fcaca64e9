//! Clinic Auth - main entry point.

use std::sync::Arc;

use chrono::Utc;
use clinic_auth::auth::password::hash_password;
use clinic_auth::{Account, AppConfig, AppState, Clinic, MemoryAccountStore, UserRole};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load()?;
    config.log_security_warnings();

    let store = Arc::new(MemoryAccountStore::new());
    seed_admin(&store, &config).await?;

    let state = AppState::new(config, store, None);
    clinic_auth::server::serve(state).await
}

/// Seed a bootstrap administrator so a fresh deployment can log in.
///
/// Email and password come from `CLINIC_ADMIN_EMAIL` / `CLINIC_ADMIN_PASSWORD`;
/// without them a development-only default is used and loudly warned about.
async fn seed_admin(store: &MemoryAccountStore, config: &AppConfig) -> anyhow::Result<()> {
    let email = std::env::var("CLINIC_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@clinic.local".to_string())
        .to_lowercase();
    let password = std::env::var("CLINIC_ADMIN_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!(
            "CLINIC_ADMIN_PASSWORD not set; using the insecure default 'admin'. \
             Set it before any production use."
        );
        "admin".to_string()
    });

    let now = Utc::now();
    store
        .insert(Account {
            id: Uuid::new_v4().to_string(),
            tenant_id: config.auth.tenant_id.clone(),
            email: email.clone(),
            name: "Administrator".to_string(),
            phone: None,
            role: UserRole::Administrator,
            password_hash: hash_password(&password)?,
            external_id: None,
            active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            clinic: Clinic {
                id: config.auth.tenant_id.clone(),
                name: "Default Clinic".to_string(),
                active: true,
            },
        })
        .await;

    tracing::info!("seeded administrator account: {email}");
    Ok(())
}
