use async_trait::async_trait;
use passport_sdk::MagicLink;
use time::OffsetDateTime;

use crate::domain::error::DomainError;

#[async_trait]
pub trait MagicLinksRepository: Send + Sync {
    /// True if any stored link, expired or not, uses `code`.
    async fn code_exists(&self, code: &str) -> Result<bool, DomainError>;

    /// Stores `link` with its timestamps cut to whole seconds.
    ///
    /// Returns `DomainError::Conflict` when `code` lost a uniqueness race.
    async fn insert(&self, link: MagicLink) -> Result<MagicLink, DomainError>;

    /// Atomically removes and returns the link with `code` if it is still
    /// pending at `now`. Of any number of concurrent callers, at most one
    /// gets `Some`.
    async fn take_active(
        &self,
        code: &str,
        now: OffsetDateTime,
    ) -> Result<Option<MagicLink>, DomainError>;

    /// Deletes every link with `expires_at <= now`.
    async fn delete_stale(&self, now: OffsetDateTime) -> Result<u64, DomainError>;
}
