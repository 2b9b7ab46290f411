use crate::StoreResult;
use async_trait::async_trait;
use std::sync::Arc;
use wlsync_types::{Account, Binding, DisplayName, IdentityKey};

/// Storage interface for account to identity bindings.
#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Owner of an identity, used to detect claim conflicts.
    async fn find_by_identity(&self, identity: &IdentityKey) -> StoreResult<Option<Account>>;

    /// Current binding of an account.
    async fn find_by_account(&self, account: Account) -> StoreResult<Option<Binding>>;

    /// Persist a new binding and return it with its creation time.
    ///
    /// Callers must have checked that nobody else owns `identity`.
    async fn insert(
        &self,
        account: Account,
        display_name: &DisplayName,
        identity: &IdentityKey,
    ) -> StoreResult<Binding>;

    /// Remove the binding for an identity. Returns whether a row existed;
    /// deleting a missing binding is not an error.
    async fn delete(&self, identity: &IdentityKey) -> StoreResult<bool>;

    /// All live bindings, oldest first.
    async fn list(&self) -> StoreResult<Vec<Binding>>;
}

#[async_trait]
impl<T> BindingStore for Arc<T>
where
    T: BindingStore + ?Sized,
{
    async fn find_by_identity(&self, identity: &IdentityKey) -> StoreResult<Option<Account>> {
        (**self).find_by_identity(identity).await
    }

    async fn find_by_account(&self, account: Account) -> StoreResult<Option<Binding>> {
        (**self).find_by_account(account).await
    }

    async fn insert(
        &self,
        account: Account,
        display_name: &DisplayName,
        identity: &IdentityKey,
    ) -> StoreResult<Binding> {
        (**self).insert(account, display_name, identity).await
    }

    async fn delete(&self, identity: &IdentityKey) -> StoreResult<bool> {
        (**self).delete(identity).await
    }

    async fn list(&self) -> StoreResult<Vec<Binding>> {
        (**self).list().await
    }
}
