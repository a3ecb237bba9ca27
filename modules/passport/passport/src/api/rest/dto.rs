use passport_sdk::{
    Account, Article, ArticlePatch, AuthContext, Identity, NewArticle, Subscription, User,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// --- requests ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSignUpRequest {
    pub account_name: String,
    pub owner_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub published: bool,
}

impl From<CreateArticleRequest> for NewArticle {
    fn from(req: CreateArticleRequest) -> Self {
        Self {
            title: req.title,
            body: req.body,
            published: req.published,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchArticleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl From<PatchArticleRequest> for ArticlePatch {
    fn from(req: PatchArticleRequest) -> Self {
        Self {
            title: req.title,
            body: req.body,
            published: req.published,
        }
    }
}

// --- responses --------------------------------------------------------------

/// Body of every issuance response. Identical whether or not a code was sent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceDto {
    pub status: &'static str,
    /// Present only when code revealing is enabled for development.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IssuanceDto {
    pub const PENDING: &'static str = "pending";

    #[must_use]
    pub const fn pending(code: Option<String>) -> Self {
        Self {
            status: Self::PENDING,
            code,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeFormDto {
    pub code_length: usize,
    pub alphabet: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDto {
    pub id: Uuid,
    pub email_address: String,
    pub staff: bool,
}

impl From<Identity> for IdentityDto {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email_address: identity.email_address,
            staff: identity.staff,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub role: &'static str,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            account_id: user.account_id,
            name: user.name,
            role: user.role.as_str(),
            active: user.active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub status: &'static str,
    pub plan: &'static str,
    pub seat_limit: i32,
    pub seats_used: i32,
    pub seats_remaining: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub trial_ends_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub current_period_ends_at: Option<OffsetDateTime>,
}

impl From<Subscription> for SubscriptionDto {
    fn from(sub: Subscription) -> Self {
        Self {
            status: sub.status.as_str(),
            plan: sub.plan.as_str(),
            seats_remaining: sub.seats_remaining(),
            seat_limit: sub.seat_limit,
            seats_used: sub.seats_used,
            trial_ends_at: sub.trial_ends_at,
            current_period_ends_at: sub.current_period_ends_at,
        }
    }
}

/// Summary of the resolved request context.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub session_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub signed_in_at: OffsetDateTime,
    pub identity: IdentityDto,
    pub user: Option<UserDto>,
    pub account: Option<AccountDto>,
    pub subscription: Option<SubscriptionDto>,
}

impl From<AuthContext> for SessionDto {
    fn from(ctx: AuthContext) -> Self {
        Self {
            session_id: ctx.session.id,
            signed_in_at: ctx.session.created_at,
            identity: ctx.identity.into(),
            user: ctx.user.map(Into::into),
            account: ctx.account.map(Into::into),
            subscription: ctx.subscription.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatusDto {
    pub completed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOverviewDto {
    pub account: AccountDto,
    pub subscription: Option<SubscriptionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Article> for ArticleDto {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            user_id: article.user_id,
            title: article.title,
            body: article.body,
            published: article.published,
            published_at: article.published_at,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
}
