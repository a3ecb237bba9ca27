use std::sync::Arc;

use passport_sdk::{AuthContext, DenialReason, Identity, NewTenant, Plan, Tenant, User};
use time::Duration;
use tracing::instrument;
use uuid::Uuid;

use super::validate_text;
use crate::domain::clock::Clock;
use crate::domain::error::DomainError;
use crate::domain::gate::{self, TENANT_ADMIN, TENANT_READ};
use crate::domain::repos::TenantsRepository;

/// Accounts, memberships and the sign-up completion transaction.
pub struct TenantService {
    repo: Arc<dyn TenantsRepository>,
    clock: Arc<dyn Clock>,
    trial_period: Duration,
    default_seat_limit: i32,
}

impl TenantService {
    pub fn new(
        repo: Arc<dyn TenantsRepository>,
        clock: Arc<dyn Clock>,
        trial_period: Duration,
        default_seat_limit: i32,
    ) -> Self {
        Self {
            repo,
            clock,
            trial_period,
            default_seat_limit,
        }
    }

    /// Creates account, owner membership and trial subscription atomically.
    ///
    /// # Errors
    /// `DomainError::Validation` when a name is blank or the subscription
    /// values are out of range; nothing is persisted in that case.
    #[instrument(skip_all, fields(identity_id = %identity.id))]
    pub async fn create_with_owner(
        &self,
        account_name: &str,
        identity: &Identity,
        owner_name: &str,
    ) -> Result<Tenant, DomainError> {
        let now = self.clock.now();
        let tenant = NewTenant {
            account_name: validate_text("account_name", account_name)?,
            owner_identity_id: identity.id,
            owner_name: validate_text("name", owner_name)?,
            plan: Plan::Individual,
            seat_limit: self.default_seat_limit,
            seats_used: 1,
            trial_ends_at: Some(now + self.trial_period),
        };
        validate_seats(&tenant)?;

        let created = self.repo.create_tenant(tenant, now).await?;
        tracing::info!(account_id = %created.account.id, "account created");
        Ok(created)
    }

    /// Whether the identity already has an active membership.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn has_membership(&self, identity_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.repo.default_membership(identity_id).await?.is_some())
    }

    /// The `owner`-role membership of the context account.
    ///
    /// # Errors
    /// `DomainError::Denied` without an account.
    pub async fn owner(&self, ctx: &AuthContext) -> Result<Option<User>, DomainError> {
        let (_, account) = gate::require_account(ctx)?;
        self.repo.find_owner(account.id).await
    }

    /// # Errors
    /// `DomainError::Denied` without an account.
    pub async fn members(&self, ctx: &AuthContext) -> Result<Vec<User>, DomainError> {
        gate::authorize(ctx, TENANT_READ)?;
        let (_, account) = gate::require_account(ctx)?;
        self.repo.list_members(account.id).await
    }

    /// Deactivates a member of the context account.
    ///
    /// Members of other accounts are reported as not found.
    ///
    /// # Errors
    /// `DomainError::Denied` when the actor is not an admin or may not manage
    /// the target; `DomainError::NotFound` for unknown ids.
    #[instrument(skip_all, fields(target_id = %user_id))]
    pub async fn deactivate_member(
        &self,
        ctx: &AuthContext,
        user_id: Uuid,
    ) -> Result<User, DomainError> {
        gate::authorize(ctx, TENANT_ADMIN)?;
        let (actor, account) = gate::require_account(ctx)?;

        let target = self
            .repo
            .find_user(user_id)
            .await?
            .filter(|u| u.account_id == account.id)
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        if !gate::can_manage(actor, &target) {
            return Err(DomainError::Denied(DenialReason::CannotManage));
        }

        let updated = self
            .repo
            .deactivate_user(target.id, self.clock.now())
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        tracing::info!("member deactivated");
        Ok(updated)
    }
}

fn validate_seats(tenant: &NewTenant) -> Result<(), DomainError> {
    if tenant.seat_limit <= 0 {
        return Err(DomainError::validation(
            "seat_limit",
            "must be greater than 0",
        ));
    }
    if tenant.seats_used < 0 {
        return Err(DomainError::validation(
            "seats_used",
            "must be greater than or equal to 0",
        ));
    }
    Ok(())
}
