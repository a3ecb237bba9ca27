use std::sync::{Arc, LazyLock};

use passport_sdk::{Identity, MagicLink, MagicLinkPurpose};
use regex::Regex;
use tracing::{Instrument, instrument};
use uuid::Uuid;

use super::MagicLinkService;
use crate::domain::clock::Clock;
use crate::domain::error::DomainError;
use crate::domain::ports::{MagicLinkMailer, MagicLinkMessage};
use crate::domain::repos::IdentitiesRepository;

#[allow(clippy::expect_used)] // constant pattern
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*$",
    )
    .expect("static regex should not panic")
});

/// Trim and lowercase.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() {
        return Err(DomainError::validation("email_address", "can't be blank"));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(DomainError::validation("email_address", "is invalid"));
    }
    Ok(())
}

/// Identity registry and the entry point for code issuance.
pub struct IdentityService {
    repo: Arc<dyn IdentitiesRepository>,
    links: Arc<MagicLinkService>,
    mailer: Arc<dyn MagicLinkMailer>,
    clock: Arc<dyn Clock>,
}

impl IdentityService {
    pub fn new(
        repo: Arc<dyn IdentitiesRepository>,
        links: Arc<MagicLinkService>,
        mailer: Arc<dyn MagicLinkMailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            links,
            mailer,
            clock,
        }
    }

    /// Returns the identity for `raw_email`, creating it if needed.
    ///
    /// A concurrent creator winning the unique index is not an error: the
    /// row it inserted is returned instead.
    ///
    /// # Errors
    /// `DomainError::Validation` for malformed addresses.
    #[instrument(skip_all)]
    pub async fn find_or_create(&self, raw_email: &str) -> Result<Identity, DomainError> {
        let email = normalize_email(raw_email);
        validate_email(&email)?;

        if let Some(found) = self.repo.find_by_email(&email).await? {
            return Ok(found);
        }

        let now = self.clock.now();
        let candidate = Identity {
            id: Uuid::now_v7(),
            email_address: email.clone(),
            staff: false,
            created_at: now,
            updated_at: now,
        };

        match self.repo.insert(candidate).await {
            Ok(created) => {
                tracing::info!(identity_id = %created.id, "identity created");
                Ok(created)
            }
            Err(DomainError::Conflict { .. }) => {
                tracing::debug!("identity insert raced, resolving to existing row");
                self.repo
                    .find_by_email(&email)
                    .await?
                    .ok_or_else(|| DomainError::database("identity missing after unique violation"))
            }
            Err(e) => Err(e),
        }
    }

    /// Lookup without creation.
    ///
    /// # Errors
    /// `DomainError::Validation` for malformed addresses.
    pub async fn find_by_email(&self, raw_email: &str) -> Result<Option<Identity>, DomainError> {
        let email = normalize_email(raw_email);
        validate_email(&email)?;
        self.repo.find_by_email(&email).await
    }

    /// # Errors
    /// Storage failures.
    pub async fn find(&self, id: Uuid) -> Result<Option<Identity>, DomainError> {
        self.repo.find(id).await
    }

    /// Issues a code for `identity` and hands it to the mailer.
    ///
    /// Delivery runs on its own task; the link is persisted and redeemable
    /// whether or not delivery succeeds.
    ///
    /// # Errors
    /// Issuance failures only; delivery failures are logged.
    #[instrument(skip_all, fields(identity_id = %identity.id))]
    pub async fn issue_magic_link(
        &self,
        identity: &Identity,
        purpose: MagicLinkPurpose,
    ) -> Result<MagicLink, DomainError> {
        let link = self.links.issue(identity.id, purpose).await?;

        let message = MagicLinkMessage::for_link(&link, identity);
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(
            async move {
                if let Err(e) = mailer.deliver(message).await {
                    tracing::warn!(error = %e, "magic link delivery failed");
                }
            }
            .in_current_span(),
        );

        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_email("  A@X.Com \n"), "a@x.com");
    }

    #[test]
    fn email_format() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@x.com").is_err());
        assert!(validate_email("space in@x.com").is_err());
    }
}
