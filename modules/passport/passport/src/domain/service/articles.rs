use std::sync::Arc;

use passport_sdk::{Article, ArticlePatch, AuthContext, NewArticle};
use tracing::instrument;
use uuid::Uuid;

use super::validate_text;
use crate::domain::clock::Clock;
use crate::domain::error::DomainError;
use crate::domain::gate::{self, TENANT_READ, TENANT_WRITE};
use crate::domain::repos::ArticlesRepository;

/// Account-scoped articles. Reads need an account; writes also need an
/// active or trialing subscription.
pub struct ArticleService {
    repo: Arc<dyn ArticlesRepository>,
    clock: Arc<dyn Clock>,
}

impl ArticleService {
    pub fn new(repo: Arc<dyn ArticlesRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// # Errors
    /// `DomainError::Denied` without an account.
    pub async fn list(&self, ctx: &AuthContext) -> Result<Vec<Article>, DomainError> {
        gate::authorize(ctx, TENANT_READ)?;
        let (_, account) = gate::require_account(ctx)?;
        self.repo.list_recent(account.id).await
    }

    /// # Errors
    /// `DomainError::NotFound` when the article is missing or belongs to
    /// another account.
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<Article, DomainError> {
        gate::authorize(ctx, TENANT_READ)?;
        self.find_scoped(ctx, id).await
    }

    /// # Errors
    /// `DomainError::Validation` for blank title or body.
    #[instrument(skip_all)]
    pub async fn create(
        &self,
        ctx: &AuthContext,
        new_article: NewArticle,
    ) -> Result<Article, DomainError> {
        gate::authorize(ctx, TENANT_WRITE)?;
        let (user, account) = gate::require_account(ctx)?;

        let now = self.clock.now();
        let article = Article {
            id: Uuid::now_v7(),
            account_id: account.id,
            user_id: user.id,
            title: validate_text("title", &new_article.title)?,
            body: validate_text("body", &new_article.body)?,
            published: new_article.published,
            published_at: new_article.published.then_some(now),
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.insert(article).await?;
        tracing::info!(article_id = %created.id, "article created");
        Ok(created)
    }

    /// # Errors
    /// `DomainError::Validation` when a provided field is blank.
    #[instrument(skip_all, fields(article_id = %id))]
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        patch: ArticlePatch,
    ) -> Result<Article, DomainError> {
        gate::authorize(ctx, TENANT_WRITE)?;
        let mut article = self.find_scoped(ctx, id).await?;
        let now = self.clock.now();

        if let Some(title) = patch.title {
            article.title = validate_text("title", &title)?;
        }
        if let Some(body) = patch.body {
            article.body = validate_text("body", &body)?;
        }
        if let Some(published) = patch.published {
            set_published(&mut article, published, now);
        }
        article.updated_at = now;

        self.repo.update(article).await
    }

    /// # Errors
    /// `DomainError::NotFound` for unknown ids.
    #[instrument(skip_all, fields(article_id = %id))]
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<(), DomainError> {
        gate::authorize(ctx, TENANT_WRITE)?;
        let (_, account) = gate::require_account(ctx)?;
        if self.repo.delete(account.id, id).await? {
            tracing::info!("article deleted");
            Ok(())
        } else {
            Err(DomainError::not_found("Article", id))
        }
    }

    /// Marks the article published and stamps `published_at`.
    ///
    /// # Errors
    /// `DomainError::NotFound` for unknown ids.
    pub async fn publish(&self, ctx: &AuthContext, id: Uuid) -> Result<Article, DomainError> {
        self.set_state(ctx, id, true).await
    }

    /// Clears `published` and `published_at`.
    ///
    /// # Errors
    /// `DomainError::NotFound` for unknown ids.
    pub async fn unpublish(&self, ctx: &AuthContext, id: Uuid) -> Result<Article, DomainError> {
        self.set_state(ctx, id, false).await
    }

    async fn set_state(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        published: bool,
    ) -> Result<Article, DomainError> {
        gate::authorize(ctx, TENANT_WRITE)?;
        let mut article = self.find_scoped(ctx, id).await?;
        let now = self.clock.now();
        article.published = published;
        article.published_at = published.then_some(now);
        article.updated_at = now;
        self.repo.update(article).await
    }

    async fn find_scoped(&self, ctx: &AuthContext, id: Uuid) -> Result<Article, DomainError> {
        let (_, account) = gate::require_account(ctx)?;
        self.repo
            .find(account.id, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Article", id))
    }
}

/// Publishing keeps the original stamp; unpublishing clears it.
fn set_published(article: &mut Article, published: bool, now: time::OffsetDateTime) {
    if published && !article.published {
        article.published_at = Some(now);
    } else if !published {
        article.published_at = None;
    }
    article.published = published;
}
