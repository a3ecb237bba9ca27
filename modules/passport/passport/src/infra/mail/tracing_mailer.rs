use async_trait::async_trait;

use crate::domain::ports::{MagicLinkMailer, MagicLinkMessage};

/// Default transport: records the delivery in the log and drops the message.
///
/// The code itself is never logged. Deployments plug a real transport in
/// through [`crate::Passport::builder`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMailer;

#[async_trait]
impl MagicLinkMailer for TracingMailer {
    async fn deliver(&self, message: MagicLinkMessage) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            expires_at = %message.expires_at,
            "magic link message dispatched"
        );
        Ok(())
    }
}
