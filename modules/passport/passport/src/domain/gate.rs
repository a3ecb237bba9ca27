//! Authorization gates.
//!
//! Pure predicates over an [`AuthContext`]. Protected operations declare the
//! gates they need as an ordered slice and run them through [`authorize`];
//! the first denial wins and carries its reason.

use passport_sdk::{Account, AuthContext, DenialReason, Subscription, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Account,
    ActiveSubscription,
    Admin,
}

/// Pipeline for read access to tenant resources.
pub const TENANT_READ: &[Gate] = &[Gate::Account];
/// Pipeline for writes to tenant resources.
pub const TENANT_WRITE: &[Gate] = &[Gate::Account, Gate::ActiveSubscription];
/// Pipeline for member management.
pub const TENANT_ADMIN: &[Gate] = &[Gate::Account, Gate::Admin];

/// Denies when the identity has no active membership yet.
///
/// # Errors
/// `DenialReason::NoAccount`.
pub fn require_account(ctx: &AuthContext) -> Result<(&User, &Account), DenialReason> {
    match (&ctx.user, &ctx.account) {
        (Some(user), Some(account)) => Ok((user, account)),
        _ => Err(DenialReason::NoAccount),
    }
}

/// Allows `active` and `trialing` only. A missing subscription is denied.
///
/// # Errors
/// `DenialReason::InactiveSubscription`.
pub fn require_active_subscription(ctx: &AuthContext) -> Result<&Subscription, DenialReason> {
    ctx.subscription
        .as_ref()
        .filter(|s| s.is_active_or_trialing())
        .ok_or(DenialReason::InactiveSubscription)
}

/// # Errors
/// `DenialReason::InsufficientRole` unless the bound user is owner or admin.
pub fn require_admin(ctx: &AuthContext) -> Result<&User, DenialReason> {
    ctx.user
        .as_ref()
        .filter(|u| u.has_admin_access())
        .ok_or(DenialReason::InsufficientRole)
}

/// True iff `actor` is owner/admin, `target` is not an owner and both belong
/// to the same account.
#[must_use]
pub fn can_manage(actor: &User, target: &User) -> bool {
    actor.has_admin_access() && !target.is_owner() && target.account_id == actor.account_id
}

/// Runs `gates` in order and stops at the first denial.
///
/// # Errors
/// The reason of the first failing gate.
pub fn authorize(ctx: &AuthContext, gates: &[Gate]) -> Result<(), DenialReason> {
    for gate in gates {
        match gate {
            Gate::Account => {
                require_account(ctx)?;
            }
            Gate::ActiveSubscription => {
                require_active_subscription(ctx)?;
            }
            Gate::Admin => {
                require_admin(ctx)?;
            }
        }
    }
    Ok(())
}
