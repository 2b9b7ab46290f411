//! In-memory binding store.
//!
//! Deterministic and test-friendly. Enforces the same uniqueness constraints
//! as the MySQL schema so conflicting writes fail the same way.

use crate::traits::BindingStore;
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use wlsync_types::{Account, Binding, DisplayName, IdentityKey};

#[derive(Debug, Default)]
struct Tables {
    by_account: HashMap<Account, Binding>,
    by_identity: HashMap<IdentityKey, Account>,
}

/// In-memory storage for development and testing
#[derive(Debug, Default)]
pub struct InMemoryBindingStore {
    tables: RwLock<Tables>,
}

impl InMemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live bindings
    pub async fn len(&self) -> usize {
        self.tables.read().await.by_account.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BindingStore for InMemoryBindingStore {
    async fn find_by_identity(&self, identity: &IdentityKey) -> StoreResult<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables.by_identity.get(identity).copied())
    }

    async fn find_by_account(&self, account: Account) -> StoreResult<Option<Binding>> {
        let tables = self.tables.read().await;
        Ok(tables.by_account.get(&account).cloned())
    }

    async fn insert(
        &self,
        account: Account,
        display_name: &DisplayName,
        identity: &IdentityKey,
    ) -> StoreResult<Binding> {
        let mut tables = self.tables.write().await;

        if tables.by_account.contains_key(&account) {
            return Err(StoreError::Conflict(format!(
                "account {account} already has a binding"
            )));
        }
        if let Some(owner) = tables.by_identity.get(identity) {
            return Err(StoreError::Conflict(format!(
                "identity {identity} already bound to account {owner}"
            )));
        }

        let binding = Binding::new(account, display_name.clone(), *identity);
        tables.by_identity.insert(*identity, account);
        tables.by_account.insert(account, binding.clone());
        Ok(binding)
    }

    async fn delete(&self, identity: &IdentityKey) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.by_identity.remove(identity) {
            Some(account) => {
                tables.by_account.remove(&account);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> StoreResult<Vec<Binding>> {
        let tables = self.tables.read().await;
        let mut bindings: Vec<Binding> = tables.by_account.values().cloned().collect();
        bindings.sort_by_key(|b| (b.created_at, b.account));
        Ok(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn name(s: &str) -> DisplayName {
        DisplayName::parse(s).unwrap()
    }

    fn key() -> IdentityKey {
        IdentityKey::from_uuid(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_binding_crud() {
        let store = InMemoryBindingStore::new();
        let account = Account::new(1);
        let identity = key();

        let binding = store.insert(account, &name("Steve"), &identity).await.unwrap();
        assert_eq!(binding.display_name.as_str(), "Steve");

        assert_eq!(store.find_by_identity(&identity).await.unwrap(), Some(account));
        let found = store.find_by_account(account).await.unwrap().unwrap();
        assert_eq!(found.identity, identity);

        assert!(store.delete(&identity).await.unwrap());
        assert!(store.find_by_account(account).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryBindingStore::new();
        let identity = key();
        store.insert(Account::new(1), &name("Steve"), &identity).await.unwrap();

        assert!(store.delete(&identity).await.unwrap());
        assert!(!store.delete(&identity).await.unwrap());
    }

    #[tokio::test]
    async fn test_identity_uniqueness() {
        let store = InMemoryBindingStore::new();
        let identity = key();
        store.insert(Account::new(1), &name("Steve"), &identity).await.unwrap();

        let err = store
            .insert(Account::new(2), &name("Steve"), &identity)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_account_uniqueness() {
        let store = InMemoryBindingStore::new();
        store.insert(Account::new(1), &name("Steve"), &key()).await.unwrap();

        let err = store
            .insert(Account::new(1), &name("Alex"), &key())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_returns_all() {
        let store = InMemoryBindingStore::new();
        store.insert(Account::new(1), &name("Steve"), &key()).await.unwrap();
        store.insert(Account::new(2), &name("Alex"), &key()).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
