use async_trait::async_trait;
use passport_sdk::Article;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Articles, always scoped by owning account.
#[async_trait]
pub trait ArticlesRepository: Send + Sync {
    /// Most recent first.
    async fn list_recent(&self, account_id: Uuid) -> Result<Vec<Article>, DomainError>;

    async fn find(&self, account_id: Uuid, id: Uuid) -> Result<Option<Article>, DomainError>;

    async fn insert(&self, article: Article) -> Result<Article, DomainError>;

    async fn update(&self, article: Article) -> Result<Article, DomainError>;

    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool, DomainError>;
}
