//! `PassportApi` trait definition.
//!
//! In-process contract other modules use to authenticate requests and to
//! drive the passwordless flow without going through HTTP.

use async_trait::async_trait;

use crate::errors::PassportError;
use crate::models::{AuthContext, Identity, MagicLink, Tenant};

/// Client metadata recorded on the session row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Outcome of a successful code exchange.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Opaque signed credential to hand to the client.
    pub token: String,
    pub context: AuthContext,
}

#[async_trait]
pub trait PassportApi: Send + Sync {
    /// Finds the identity for `email` (normalized) or creates it.
    async fn find_or_create_identity(&self, email: &str) -> Result<Identity, PassportError>;

    /// Issues a sign-in code if an identity exists for `email`.
    ///
    /// Returns `Ok(None)` for unknown addresses; callers must respond the same
    /// way in both cases.
    async fn request_sign_in(&self, email: &str) -> Result<Option<MagicLink>, PassportError>;

    /// Creates the identity if needed and issues a sign-up code.
    async fn request_sign_up(&self, email: &str) -> Result<MagicLink, PassportError>;

    /// Consumes a submitted code and starts a session for its identity.
    async fn sign_in_with_code(
        &self,
        code: &str,
        client: ClientInfo,
    ) -> Result<SignedIn, PassportError>;

    /// Resolves a session token into a request context.
    async fn resume(&self, token: &str) -> Result<AuthContext, PassportError>;

    /// Revokes the session behind `ctx`; derived tokens stop working.
    async fn sign_out(&self, ctx: &AuthContext) -> Result<(), PassportError>;

    /// Creates account, owner membership and subscription for the context identity.
    async fn complete_sign_up(
        &self,
        ctx: &AuthContext,
        account_name: &str,
        owner_name: &str,
    ) -> Result<Tenant, PassportError>;
}
