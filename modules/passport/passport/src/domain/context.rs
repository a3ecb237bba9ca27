use passport_sdk::{AuthContext, Identity, Session};

use super::error::DomainError;
use super::repos::TenantsRepository;

/// Binds a live session to its identity's default membership.
///
/// Identities without an active membership get a context with no user,
/// account or subscription; the account gate turns that into a denial.
pub async fn resolve(
    tenants: &dyn TenantsRepository,
    session: Session,
    identity: Identity,
) -> Result<AuthContext, DomainError> {
    let user = tenants.default_membership(identity.id).await?;

    let (account, subscription) = match &user {
        Some(user) => (
            tenants.find_account(user.account_id).await?,
            tenants.find_subscription(user.account_id).await?,
        ),
        None => (None, None),
    };

    Ok(AuthContext {
        session,
        identity,
        user,
        account,
        subscription,
    })
}
