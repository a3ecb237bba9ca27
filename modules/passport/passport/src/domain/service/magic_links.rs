use std::sync::Arc;

use passport_sdk::{MagicLink, MagicLinkPurpose};
use time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::code::{CodeSource, sanitize};
use crate::domain::error::DomainError;
use crate::domain::repos::MagicLinksRepository;

/// Issues, consumes and sweeps one-time codes.
pub struct MagicLinkService {
    repo: Arc<dyn MagicLinksRepository>,
    codes: Arc<dyn CodeSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    max_attempts: u32,
}

impl MagicLinkService {
    pub fn new(
        repo: Arc<dyn MagicLinksRepository>,
        codes: Arc<dyn CodeSource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            repo,
            codes,
            clock,
            ttl,
            max_attempts,
        }
    }

    /// Creates a pending link for `identity_id`.
    ///
    /// A candidate is redrawn when it is already stored or when the insert
    /// loses a uniqueness race, at most `max_attempts` times in total.
    ///
    /// # Errors
    /// `DomainError::GenerationExhausted` when every draw collided.
    #[instrument(skip_all, fields(identity_id = %identity_id, purpose = purpose.as_str()))]
    pub async fn issue(
        &self,
        identity_id: Uuid,
        purpose: MagicLinkPurpose,
    ) -> Result<MagicLink, DomainError> {
        let now = self.clock.now();

        for attempt in 1..=self.max_attempts {
            let code = self.codes.candidate();
            if self.repo.code_exists(&code).await? {
                tracing::debug!(attempt, "code collision, redrawing");
                continue;
            }

            let link = MagicLink {
                id: Uuid::now_v7(),
                identity_id,
                code,
                purpose,
                expires_at: now + self.ttl,
                created_at: now,
            };

            match self.repo.insert(link).await {
                Ok(link) => {
                    tracing::info!(link_id = %link.id, "magic link issued");
                    return Ok(link);
                }
                Err(DomainError::Conflict { .. }) => {
                    tracing::debug!(attempt, "code lost insert race, redrawing");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(
            attempts = self.max_attempts,
            "magic link code generation exhausted, code space may be saturated"
        );
        Err(DomainError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Redeems a submitted code exactly once.
    ///
    /// Wrong, expired and already used codes are indistinguishable.
    ///
    /// # Errors
    /// `DomainError::InvalidOrExpiredCode`.
    #[instrument(skip_all)]
    pub async fn consume(&self, raw_code: &str) -> Result<MagicLink, DomainError> {
        let code = sanitize(raw_code);
        if code.is_empty() {
            return Err(DomainError::InvalidOrExpiredCode);
        }

        let Some(link) = self.repo.take_active(&code, self.clock.now()).await? else {
            tracing::debug!("no pending link for submitted code");
            return Err(DomainError::InvalidOrExpiredCode);
        };

        tracing::info!(link_id = %link.id, identity_id = %link.identity_id, "magic link consumed");
        Ok(link)
    }

    /// Deletes expired links. Pending links are never touched.
    ///
    /// # Errors
    /// Storage failures.
    #[instrument(skip_all)]
    pub async fn cleanup(&self) -> Result<u64, DomainError> {
        let removed = self.repo.delete_stale(self.clock.now()).await?;
        tracing::info!(removed, "stale magic links purged");
        Ok(removed)
    }
}
