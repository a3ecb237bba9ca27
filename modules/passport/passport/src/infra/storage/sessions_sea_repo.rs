use async_trait::async_trait;
use passport_sdk::Session;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use super::db::db_err;
use super::entity::session::{ActiveModel as SessionAM, Entity as SessionEntity};
use crate::domain::error::DomainError;
use crate::domain::repos::SessionsRepository;

/// ORM-based implementation of the `SessionsRepository` trait.
#[derive(Clone)]
pub struct OrmSessionsRepository {
    db: DatabaseConnection,
}

impl OrmSessionsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionsRepository for OrmSessionsRepository {
    async fn insert(&self, session: Session) -> Result<Session, DomainError> {
        let created = SessionAM::from(&session)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(created.into())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Session>, DomainError> {
        let found = SessionEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let res = SessionEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
