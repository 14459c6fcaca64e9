//! Persistence collaborator for account lookups.
//!
//! The authentication core never owns account records; it talks to whatever
//! implements [`AccountStore`]. Store failures are internal errors and
//! surface immediately as 500; the core never retries. An in-memory
//! implementation is provided for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::account::Account;
use crate::domain::error::Result;

/// Account lookups and the single mutation the core performs (last-login).
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by lowercased email. Emails are unique within a
    /// clinic, which the backing store is responsible for enforcing.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Look up an account by its id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>>;

    /// Look up an account by its external identity provider subject, scoped
    /// to one clinic.
    async fn find_by_external_id(&self, external_id: &str, tenant_id: &str)
    -> Result<Option<Account>>;

    /// Record a successful login. Callers treat failures as best-effort.
    async fn record_login(&self, id: &str) -> Result<()>;
}

/// In-memory account store for development and tests.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account, keyed by id.
    pub async fn insert(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.id.clone(), account);
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
        tenant_id: &str,
    ) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| {
                a.tenant_id == tenant_id && a.external_id.as_deref() == Some(external_id)
            })
            .cloned())
    }

    async fn record_login(&self, id: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if let Some(account) = accounts.get_mut(id) {
            let now = Utc::now();
            account.last_login_at = Some(now);
            account.updated_at = now;
        }
        Ok(())
    }
}
