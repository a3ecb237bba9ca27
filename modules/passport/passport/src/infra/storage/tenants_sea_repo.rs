use async_trait::async_trait;
use passport_sdk::{Account, NewTenant, Role, Subscription, SubscriptionStatus, Tenant, User};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db::db_err;
use super::entity::{account, subscription, user};
use crate::domain::error::DomainError;
use crate::domain::repos::TenantsRepository;

/// ORM-based implementation of the `TenantsRepository` trait.
#[derive(Clone)]
pub struct OrmTenantsRepository {
    db: DatabaseConnection,
}

impl OrmTenantsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn user_from(m: user::Model) -> Result<User, DomainError> {
    Ok(User::try_from(m)?)
}

#[async_trait]
impl TenantsRepository for OrmTenantsRepository {
    async fn create_tenant(
        &self,
        tenant: NewTenant,
        now: OffsetDateTime,
    ) -> Result<Tenant, DomainError> {
        let account_id = Uuid::now_v7();

        let account_am = account::ActiveModel {
            id: Set(account_id),
            name: Set(tenant.account_name),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let owner_am = user::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(account_id),
            identity_id: Set(Some(tenant.owner_identity_id)),
            name: Set(tenant.owner_name),
            role: Set(Role::Owner.as_str().to_owned()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let subscription_am = subscription::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(account_id),
            status: Set(SubscriptionStatus::Trialing.as_str().to_owned()),
            plan: Set(tenant.plan.as_str().to_owned()),
            seat_limit: Set(tenant.seat_limit),
            seats_used: Set(tenant.seats_used),
            trial_ends_at: Set(tenant.trial_ends_at),
            current_period_ends_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Commit only if all three inserts succeed; any error rolls back.
        let (account, owner, subscription) = self
            .db
            .transaction::<_, _, DbErr>(|txn| {
                Box::pin(async move {
                    let account = account_am.insert(txn).await?;
                    let owner = owner_am.insert(txn).await?;
                    let subscription = subscription_am.insert(txn).await?;
                    Ok((account, owner, subscription))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) | TransactionError::Transaction(e) => db_err(e),
            })?;

        Ok(Tenant {
            account: account.into(),
            owner: user_from(owner)?,
            subscription: Subscription::try_from(subscription)?,
        })
    }

    async fn default_membership(&self, identity_id: Uuid) -> Result<Option<User>, DomainError> {
        user::Entity::find()
            .filter(user::Column::IdentityId.eq(identity_id))
            .filter(user::Column::Active.eq(true))
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(user_from)
            .transpose()
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        let found = account::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_subscription(
        &self,
        account_id: Uuid,
    ) -> Result<Option<Subscription>, DomainError> {
        let found = subscription::Entity::find()
            .filter(subscription::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Subscription::try_from).transpose()?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(user_from)
            .transpose()
    }

    async fn find_owner(&self, account_id: Uuid) -> Result<Option<User>, DomainError> {
        user::Entity::find()
            .filter(user::Column::AccountId.eq(account_id))
            .filter(user::Column::Role.eq(Role::Owner.as_str()))
            .order_by_asc(user::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(user_from)
            .transpose()
    }

    async fn list_members(&self, account_id: Uuid) -> Result<Vec<User>, DomainError> {
        user::Entity::find()
            .filter(user::Column::AccountId.eq(account_id))
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(user_from)
            .collect()
    }

    async fn deactivate_user(
        &self,
        id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Option<User>, DomainError> {
        let Some(found) = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut am = found.into_active_model();
        am.active = Set(false);
        am.identity_id = Set(None);
        am.updated_at = Set(now);
        let updated = am.update(&self.db).await.map_err(db_err)?;
        user_from(updated).map(Some)
    }
}
