use async_trait::async_trait;
use passport_sdk::MagicLink;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use time::OffsetDateTime;

use super::db::{db_err, insert_err, whole_seconds};
use super::entity::magic_link::{ActiveModel as MagicLinkAM, Column, Entity as MagicLinkEntity};
use crate::domain::error::DomainError;
use crate::domain::repos::MagicLinksRepository;

/// ORM-based implementation of the `MagicLinksRepository` trait.
#[derive(Clone)]
pub struct OrmMagicLinksRepository {
    db: DatabaseConnection,
}

impl OrmMagicLinksRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MagicLinksRepository for OrmMagicLinksRepository {
    async fn code_exists(&self, code: &str) -> Result<bool, DomainError> {
        let count = MagicLinkEntity::find()
            .filter(Column::Code.eq(code))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn insert(&self, link: MagicLink) -> Result<MagicLink, DomainError> {
        let link = MagicLink {
            expires_at: whole_seconds(link.expires_at),
            created_at: whole_seconds(link.created_at),
            ..link
        };
        let created = MagicLinkAM::from(&link)
            .insert(&self.db)
            .await
            .map_err(insert_err("magic_links.code"))?;
        Ok(MagicLink::try_from(created)?)
    }

    async fn take_active(
        &self,
        code: &str,
        now: OffsetDateTime,
    ) -> Result<Option<MagicLink>, DomainError> {
        let now = whole_seconds(now);
        let Some(found) = MagicLinkEntity::find()
            .filter(Column::Code.eq(code))
            .filter(Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        // The delete is the claim: only the caller that removes the row wins.
        let deleted = MagicLinkEntity::delete_many()
            .filter(Column::Id.eq(found.id))
            .filter(Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if deleted.rows_affected == 1 {
            Ok(Some(MagicLink::try_from(found)?))
        } else {
            Ok(None)
        }
    }

    async fn delete_stale(&self, now: OffsetDateTime) -> Result<u64, DomainError> {
        let now = whole_seconds(now);
        let res = MagicLinkEntity::delete_many()
            .filter(Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected)
    }
}
