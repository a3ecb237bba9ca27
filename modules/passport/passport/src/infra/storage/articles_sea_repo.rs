use async_trait::async_trait;
use passport_sdk::Article;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::db::db_err;
use super::entity::article::{ActiveModel as ArticleAM, Column, Entity as ArticleEntity};
use crate::domain::error::DomainError;
use crate::domain::repos::ArticlesRepository;

/// ORM-based implementation of the `ArticlesRepository` trait.
#[derive(Clone)]
pub struct OrmArticlesRepository {
    db: DatabaseConnection,
}

impl OrmArticlesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArticlesRepository for OrmArticlesRepository {
    async fn list_recent(&self, account_id: Uuid) -> Result<Vec<Article>, DomainError> {
        let rows = ArticleEntity::find()
            .filter(Column::AccountId.eq(account_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find(&self, account_id: Uuid, id: Uuid) -> Result<Option<Article>, DomainError> {
        let found = ArticleEntity::find_by_id(id)
            .filter(Column::AccountId.eq(account_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, article: Article) -> Result<Article, DomainError> {
        let created = ArticleAM::from(&article)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(created.into())
    }

    async fn update(&self, article: Article) -> Result<Article, DomainError> {
        let updated = ArticleAM::from(&article)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(updated.into())
    }

    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let res = ArticleEntity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::AccountId.eq(account_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
