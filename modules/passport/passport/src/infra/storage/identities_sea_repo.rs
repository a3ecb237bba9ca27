use async_trait::async_trait;
use passport_sdk::Identity;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::db::{db_err, insert_err};
use super::entity::identity::{ActiveModel as IdentityAM, Column, Entity as IdentityEntity};
use crate::domain::error::DomainError;
use crate::domain::repos::IdentitiesRepository;

/// ORM-based implementation of the `IdentitiesRepository` trait.
#[derive(Clone)]
pub struct OrmIdentitiesRepository {
    db: DatabaseConnection,
}

impl OrmIdentitiesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentitiesRepository for OrmIdentitiesRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Identity>, DomainError> {
        let found = IdentityEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        let found = IdentityEntity::find()
            .filter(Column::EmailAddress.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, identity: Identity) -> Result<Identity, DomainError> {
        let created = IdentityAM::from(&identity)
            .insert(&self.db)
            .await
            .map_err(insert_err("identities.email_address"))?;
        Ok(created.into())
    }
}
