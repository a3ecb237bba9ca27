//! Output ports (interfaces) for domain services.

use async_trait::async_trait;
use passport_sdk::{Identity, MagicLink};
use time::OffsetDateTime;

/// Outgoing message carrying a one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicLinkMessage {
    pub to: String,
    pub subject: String,
    pub code: String,
    pub expires_at: OffsetDateTime,
}

impl MagicLinkMessage {
    #[must_use]
    pub fn for_link(link: &MagicLink, identity: &Identity) -> Self {
        Self {
            to: identity.email_address.clone(),
            subject: format!("Your verification code is {}", link.code),
            code: link.code.clone(),
            expires_at: link.expires_at,
        }
    }
}

/// Port for the mail transport.
///
/// Called off the request path; failures are logged and otherwise ignored.
#[async_trait]
pub trait MagicLinkMailer: Send + Sync {
    async fn deliver(&self, message: MagicLinkMessage) -> anyhow::Result<()>;
}
