use async_trait::async_trait;
use passport_sdk::{
    AuthContext, ClientInfo, Identity, MagicLink, MagicLinkPurpose, PassportApi, PassportError,
    SignedIn, Tenant,
};

use crate::domain::error::DomainError;
use crate::domain::service::AppServices;

/// In-process `PassportApi` backed by the domain services.
pub struct LocalClient {
    services: AppServices,
}

impl LocalClient {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl PassportApi for LocalClient {
    async fn find_or_create_identity(&self, email: &str) -> Result<Identity, PassportError> {
        self.services
            .identities
            .find_or_create(email)
            .await
            .map_err(Into::into)
    }

    async fn request_sign_in(&self, email: &str) -> Result<Option<MagicLink>, PassportError> {
        let ids = &self.services.identities;
        let Some(identity) = ids.find_by_email(email).await? else {
            return Ok(None);
        };
        let link = ids
            .issue_magic_link(&identity, MagicLinkPurpose::SignIn)
            .await?;
        Ok(Some(link))
    }

    async fn request_sign_up(&self, email: &str) -> Result<MagicLink, PassportError> {
        let ids = &self.services.identities;
        let identity = ids.find_or_create(email).await?;
        ids.issue_magic_link(&identity, MagicLinkPurpose::SignUp)
            .await
            .map_err(Into::into)
    }

    async fn sign_in_with_code(
        &self,
        code: &str,
        client: ClientInfo,
    ) -> Result<SignedIn, PassportError> {
        let link = self.services.magic_links.consume(code).await?;
        let identity = self
            .services
            .identities
            .find(link.identity_id)
            .await?
            .ok_or(DomainError::InvalidOrExpiredCode)?;

        self.services
            .sessions
            .start(identity, client)
            .await
            .map_err(Into::into)
    }

    async fn resume(&self, token: &str) -> Result<AuthContext, PassportError> {
        self.services
            .sessions
            .resume(token)
            .await?
            .ok_or(PassportError::AuthenticationRequired)
    }

    async fn sign_out(&self, ctx: &AuthContext) -> Result<(), PassportError> {
        self.services
            .sessions
            .terminate(ctx)
            .await
            .map_err(Into::into)
    }

    async fn complete_sign_up(
        &self,
        ctx: &AuthContext,
        account_name: &str,
        owner_name: &str,
    ) -> Result<Tenant, PassportError> {
        self.services
            .tenants
            .create_with_owner(account_name, &ctx.identity, owner_name)
            .await
            .map_err(Into::into)
    }
}
