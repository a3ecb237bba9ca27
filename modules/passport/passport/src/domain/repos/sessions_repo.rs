use async_trait::async_trait;
use passport_sdk::Session;
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub trait SessionsRepository: Send + Sync {
    async fn insert(&self, session: Session) -> Result<Session, DomainError>;

    async fn find(&self, id: Uuid) -> Result<Option<Session>, DomainError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
