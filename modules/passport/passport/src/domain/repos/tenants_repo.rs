use async_trait::async_trait;
use passport_sdk::{Account, NewTenant, Subscription, Tenant, User};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Accounts, memberships and subscriptions.
#[async_trait]
pub trait TenantsRepository: Send + Sync {
    /// Inserts account, owner membership and subscription in one transaction.
    /// Nothing is persisted unless all three succeed.
    async fn create_tenant(
        &self,
        tenant: NewTenant,
        now: OffsetDateTime,
    ) -> Result<Tenant, DomainError>;

    /// Earliest-created active membership of `identity_id`, ties broken by id.
    async fn default_membership(&self, identity_id: Uuid) -> Result<Option<User>, DomainError>;

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DomainError>;

    async fn find_subscription(&self, account_id: Uuid)
    -> Result<Option<Subscription>, DomainError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    async fn find_owner(&self, account_id: Uuid) -> Result<Option<User>, DomainError>;

    /// All memberships of the account, oldest first.
    async fn list_members(&self, account_id: Uuid) -> Result<Vec<User>, DomainError>;

    /// Marks the membership inactive and detaches its identity.
    async fn deactivate_user(
        &self,
        id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Option<User>, DomainError>;
}
