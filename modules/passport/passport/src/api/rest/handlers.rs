use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use passport_sdk::{MagicLink, MagicLinkPurpose};
use uuid::Uuid;

use super::RestState;
use super::dto::{
    AccountOverviewDto, ArticleDto, CodeRequest, CompleteSignUpRequest, CompletionStatusDto,
    CreateArticleRequest, EmailRequest, ExchangeFormDto, HealthDto, IssuanceDto,
    PatchArticleRequest, SessionDto, UserDto,
};
use super::extract::{Authenticated, Client};
use super::problem::ApiResult;
use crate::domain::code::{CODE_ALPHABET, CODE_LENGTH};
use crate::domain::error::DomainError;
use crate::domain::gate;

fn issuance(state: &RestState, link: Option<MagicLink>) -> (StatusCode, Json<IssuanceDto>) {
    let code = link.map(|l| l.code).filter(|_| state.reveal_codes);
    (StatusCode::ACCEPTED, Json(IssuanceDto::pending(code)))
}

#[allow(clippy::unused_async)] // axum handler signature
pub async fn health() -> Json<HealthDto> {
    Json(HealthDto { status: "ok" })
}

// --- session ----------------------------------------------------------------

#[allow(clippy::unused_async)] // axum handler signature
pub async fn show_session(Authenticated(ctx): Authenticated) -> Json<SessionDto> {
    Json(ctx.into())
}

/// Sign-in issuance. Unknown addresses get the same response as known ones.
pub async fn request_sign_in(
    Extension(state): Extension<Arc<RestState>>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<impl IntoResponse> {
    let svc = &state.services;
    let link = match svc.identities.find_by_email(&req.email_address).await? {
        Some(identity) => Some(
            svc.identities
                .issue_magic_link(&identity, MagicLinkPurpose::SignIn)
                .await?,
        ),
        None => None,
    };
    Ok(issuance(&state, link))
}

pub async fn sign_out(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
) -> ApiResult<impl IntoResponse> {
    state.services.sessions.terminate(&ctx).await?;
    let removal = state.cookies.removal();
    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, removal.to_string())]),
    ))
}

#[allow(clippy::unused_async)] // axum handler signature
pub async fn show_exchange() -> Json<ExchangeFormDto> {
    Json(ExchangeFormDto {
        code_length: CODE_LENGTH,
        alphabet: CODE_ALPHABET,
    })
}

/// Redeems a code and starts a session.
pub async fn exchange_code(
    Extension(state): Extension<Arc<RestState>>,
    Client(client): Client,
    Json(req): Json<CodeRequest>,
) -> ApiResult<impl IntoResponse> {
    let svc = &state.services;
    let link = svc.magic_links.consume(&req.code).await?;
    let identity = svc
        .identities
        .find(link.identity_id)
        .await?
        .ok_or(DomainError::InvalidOrExpiredCode)?;

    let signed_in = svc.sessions.start(identity, client).await?;
    let cookie = state.cookies.session(signed_in.token);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(SessionDto::from(signed_in.context)),
    ))
}

// --- sign-up ----------------------------------------------------------------

pub async fn request_sign_up(
    Extension(state): Extension<Arc<RestState>>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<impl IntoResponse> {
    let svc = &state.services;
    let identity = svc.identities.find_or_create(&req.email_address).await?;
    let link = svc
        .identities
        .issue_magic_link(&identity, MagicLinkPurpose::SignUp)
        .await?;
    Ok(issuance(&state, Some(link)))
}

pub async fn show_completion(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
) -> ApiResult<Json<CompletionStatusDto>> {
    let completed = state.services.tenants.has_membership(ctx.identity.id).await?;
    Ok(Json(CompletionStatusDto { completed }))
}

pub async fn complete_sign_up(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
    Json(req): Json<CompleteSignUpRequest>,
) -> ApiResult<impl IntoResponse> {
    let tenant = state
        .services
        .tenants
        .create_with_owner(&req.account_name, &ctx.identity, &req.owner_name)
        .await?;

    let ctx = ctx.with_tenant(tenant);
    Ok((StatusCode::CREATED, Json(SessionDto::from(ctx))))
}

// --- account ----------------------------------------------------------------

#[allow(clippy::unused_async)] // axum handler signature
pub async fn show_account(
    Authenticated(ctx): Authenticated,
) -> ApiResult<Json<AccountOverviewDto>> {
    let (_, account) = gate::require_account(&ctx).map_err(DomainError::from)?;

    Ok(Json(AccountOverviewDto {
        account: account.clone().into(),
        subscription: ctx.subscription.map(Into::into),
    }))
}

pub async fn list_members(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
) -> ApiResult<Json<Vec<UserDto>>> {
    let members = state.services.tenants.members(&ctx).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

pub async fn deactivate_member(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.tenants.deactivate_member(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- articles ---------------------------------------------------------------

pub async fn list_articles(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
) -> ApiResult<Json<Vec<ArticleDto>>> {
    let articles = state.services.articles.list(&ctx).await?;
    Ok(Json(articles.into_iter().map(Into::into).collect()))
}

pub async fn create_article(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
    Json(req): Json<CreateArticleRequest>,
) -> ApiResult<impl IntoResponse> {
    let article = state.services.articles.create(&ctx, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ArticleDto::from(article))))
}

pub async fn show_article(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ArticleDto>> {
    let article = state.services.articles.get(&ctx, id).await?;
    Ok(Json(article.into()))
}

pub async fn update_article(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
    Json(req): Json<PatchArticleRequest>,
) -> ApiResult<Json<ArticleDto>> {
    let article = state.services.articles.update(&ctx, id, req.into()).await?;
    Ok(Json(article.into()))
}

pub async fn delete_article(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.articles.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_article(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ArticleDto>> {
    let article = state.services.articles.publish(&ctx, id).await?;
    Ok(Json(article.into()))
}

pub async fn unpublish_article(
    Extension(state): Extension<Arc<RestState>>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ArticleDto>> {
    let article = state.services.articles.unpublish(&ctx, id).await?;
    Ok(Json(article.into()))
}
