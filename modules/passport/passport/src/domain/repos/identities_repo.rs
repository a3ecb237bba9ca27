use async_trait::async_trait;
use passport_sdk::Identity;
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub trait IdentitiesRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Identity>, DomainError>;

    /// Lookup by already-normalized address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError>;

    /// Inserts a new identity.
    ///
    /// Returns `DomainError::Conflict` when the address is already taken,
    /// including when a concurrent insert won the race.
    async fn insert(&self, identity: Identity) -> Result<Identity, DomainError>;
}
