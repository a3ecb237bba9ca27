use std::sync::Arc;

use passport_sdk::{AuthContext, ClientInfo, Identity, Session, SignedIn};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::context;
use crate::domain::error::DomainError;
use crate::domain::repos::{IdentitiesRepository, SessionsRepository, TenantsRepository};
use crate::domain::token::SessionTokens;

/// Session lifecycle: start, resume, terminate.
pub struct SessionService {
    sessions: Arc<dyn SessionsRepository>,
    identities: Arc<dyn IdentitiesRepository>,
    tenants: Arc<dyn TenantsRepository>,
    tokens: SessionTokens,
    clock: Arc<dyn Clock>,
    user_agent_max_len: usize,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionsRepository>,
        identities: Arc<dyn IdentitiesRepository>,
        tenants: Arc<dyn TenantsRepository>,
        tokens: SessionTokens,
        clock: Arc<dyn Clock>,
        user_agent_max_len: usize,
    ) -> Self {
        Self {
            sessions,
            identities,
            tenants,
            tokens,
            clock,
            user_agent_max_len,
        }
    }

    /// Persists a session for `identity` and signs a token naming it.
    ///
    /// # Errors
    /// Storage or signing failures.
    #[instrument(skip_all, fields(identity_id = %identity.id))]
    pub async fn start(
        &self,
        identity: Identity,
        client: ClientInfo,
    ) -> Result<SignedIn, DomainError> {
        let max = self.user_agent_max_len;
        let session = Session {
            id: Uuid::now_v7(),
            identity_id: identity.id,
            ip_address: client.ip_address,
            user_agent: client.user_agent.map(|ua| ua.chars().take(max).collect()),
            created_at: self.clock.now(),
        };

        let session = self.sessions.insert(session).await?;
        let token = self.tokens.issue(session.id)?;
        tracing::info!(session_id = %session.id, "session started");

        let context = context::resolve(self.tenants.as_ref(), session, identity).await?;
        Ok(SignedIn { token, context })
    }

    /// Resolves `token` into a request context.
    ///
    /// `Ok(None)` covers every authentication failure: bad signature, wrong
    /// purpose, malformed input, revoked session.
    ///
    /// # Errors
    /// Storage failures only.
    #[instrument(skip_all)]
    pub async fn resume(&self, token: &str) -> Result<Option<AuthContext>, DomainError> {
        let Some(session_id) = self.tokens.verify(token) else {
            tracing::debug!("session token rejected");
            return Ok(None);
        };

        let Some(session) = self.sessions.find(session_id).await? else {
            tracing::debug!(%session_id, "session revoked or unknown");
            return Ok(None);
        };

        let Some(identity) = self.identities.find(session.identity_id).await? else {
            return Ok(None);
        };

        context::resolve(self.tenants.as_ref(), session, identity)
            .await
            .map(Some)
    }

    /// Deletes the session row; every token naming it stops resolving.
    ///
    /// # Errors
    /// Storage failures.
    #[instrument(skip_all, fields(session_id = %ctx.session.id))]
    pub async fn terminate(&self, ctx: &AuthContext) -> Result<(), DomainError> {
        if self.sessions.delete(ctx.session.id).await? {
            tracing::info!("session terminated");
        }
        Ok(())
    }
}
