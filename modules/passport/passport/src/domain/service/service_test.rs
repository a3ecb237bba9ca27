#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use passport_sdk::{
    ArticlePatch, AuthContext, ClientInfo, DenialReason, MagicLink, MagicLinkPurpose, NewArticle,
    Role, SubscriptionStatus,
};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, PaginatorTrait, Set};
use secrecy::SecretString;
use time::{Duration, OffsetDateTime};
use tracing_test::traced_test;
use uuid::Uuid;

use super::{AppServices, Collaborators, MagicLinkService, ServiceConfig};
use crate::domain::clock::{Clock, ManualClock};
use crate::domain::code::CodeSource;
use crate::domain::error::DomainError;
use crate::domain::rate_limit::Endpoint;
use crate::domain::repos::MagicLinksRepository;
use crate::domain::token::SessionTokens;
use crate::infra::storage::entity::{account, subscription, user};
use crate::infra::storage::test_support::{
    FailingMailer, Harness, ScriptedCodes, TEST_SECRET, inmem_db, repositories,
};

/// Signs `email` in and completes sign-up, returning a fresh context.
async fn onboarded(h: &Harness, email: &str) -> (String, AuthContext) {
    let svc = &h.services;
    let identity = svc.identities.find_or_create(email).await.unwrap();
    let signed_in = svc
        .sessions
        .start(identity.clone(), ClientInfo::default())
        .await
        .unwrap();
    svc.tenants
        .create_with_owner("Acme", &identity, "Ann Owner")
        .await
        .unwrap();
    let ctx = svc.sessions.resume(&signed_in.token).await.unwrap().unwrap();
    (signed_in.token, ctx)
}

async fn add_member(h: &Harness, ctx: &AuthContext, email: &str, role: Role) -> AuthContext {
    let svc = &h.services;
    let identity = svc.identities.find_or_create(email).await.unwrap();
    let now = h.clock.now();
    user::ActiveModel {
        id: Set(Uuid::now_v7()),
        account_id: Set(ctx.account.as_ref().unwrap().id),
        identity_id: Set(Some(identity.id)),
        name: Set(email.to_owned()),
        role: Set(role.as_str().to_owned()),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&h.db)
    .await
    .unwrap();
    let signed_in = svc
        .sessions
        .start(identity, ClientInfo::default())
        .await
        .unwrap();
    signed_in.context
}

async fn set_status(h: &Harness, ctx: &AuthContext, status: SubscriptionStatus) -> AuthContext {
    let sub = subscription::Entity::find_by_id(ctx.subscription.as_ref().unwrap().id)
        .one(&h.db)
        .await
        .unwrap()
        .unwrap();
    let mut am = sub.into_active_model();
    am.status = Set(status.as_str().to_owned());
    am.update(&h.db).await.unwrap();

    h.services.sessions.resume(&token_for(ctx)).await.unwrap().unwrap()
}

fn token_for(ctx: &AuthContext) -> String {
    SessionTokens::new(&SecretString::from(TEST_SECRET.to_owned()))
        .issue(ctx.session.id)
        .unwrap()
}

// --- identities -----------------------------------------------------------

#[tokio::test]
async fn find_or_create_normalizes_and_reuses() {
    let h = Harness::new().await;
    let a = h.services.identities.find_or_create(" A@X.com ").await.unwrap();
    let b = h.services.identities.find_or_create("a@x.com").await.unwrap();

    assert_eq!(a.id, b.id);
    assert_eq!(a.email_address, "a@x.com");
}

#[tokio::test]
async fn find_or_create_is_race_safe() {
    let h = Harness::new().await;
    let ids = &h.services.identities;

    let (a, b, c) = tokio::join!(
        ids.find_or_create("race@x.com"),
        ids.find_or_create("Race@X.com"),
        ids.find_or_create(" race@x.com"),
    );

    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert_eq!(a.id, b.id);
    assert_eq!(b.id, c.id);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let h = Harness::new().await;
    for bad in ["", "   ", "nope", "a@@x.com"] {
        let err = h.services.identities.find_or_create(bad).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }), "{bad}: {err:?}");
    }
}

#[tokio::test]
async fn find_by_email_does_not_create() {
    let h = Harness::new().await;
    assert!(
        h.services
            .identities
            .find_by_email("ghost@x.com")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        h.services
            .identities
            .find_by_email("ghost@x.com")
            .await
            .unwrap()
            .is_none()
    );
}

// --- magic links ----------------------------------------------------------

#[tokio::test]
async fn sign_up_code_round_trip_is_single_use() {
    let mut h = Harness::new().await;
    h.codes.push("K3F9QZ");
    let svc = &h.services;

    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();
    let link = svc
        .identities
        .issue_magic_link(&identity, MagicLinkPurpose::SignUp)
        .await
        .unwrap();
    assert_eq!(link.code, "K3F9QZ");
    assert_eq!(link.purpose, MagicLinkPurpose::SignUp);

    let consumed = svc.magic_links.consume("k3f9qz").await.unwrap();
    assert_eq!(consumed.identity_id, identity.id);

    let signed_in = svc
        .sessions
        .start(identity, ClientInfo::default())
        .await
        .unwrap();
    assert!(svc.sessions.resume(&signed_in.token).await.unwrap().is_some());

    let again = svc.magic_links.consume("k3f9qz").await.unwrap_err();
    assert!(matches!(again, DomainError::InvalidOrExpiredCode));

    let message = h.outbox.recv().await.unwrap();
    assert_eq!(message.to, "a@x.com");
    assert_eq!(message.subject, "Your verification code is K3F9QZ");
}

#[tokio::test]
async fn expired_code_fails_before_sweep_and_sweep_removes_it() {
    let h = Harness::new().await;
    h.codes.push("EXP1RE");
    let svc = &h.services;
    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();
    svc.identities
        .issue_magic_link(&identity, MagicLinkPurpose::SignIn)
        .await
        .unwrap();

    h.clock.advance(Duration::minutes(15));

    let err = svc.magic_links.consume("EXP1RE").await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidOrExpiredCode));

    let report = svc.cleanup().await.unwrap();
    assert_eq!(report.magic_links, 1);
}

#[tokio::test]
async fn unknown_and_blank_codes_fail_uniformly() {
    let h = Harness::new().await;
    for raw in ["", "  ", "***", "ZZZZZZ"] {
        let err = h.services.magic_links.consume(raw).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidOrExpiredCode), "{raw}");
    }
}

#[tokio::test]
async fn colliding_candidate_is_redrawn() {
    let h = Harness::new().await;
    h.codes.push("AAAAAA");
    h.codes.push("AAAAAA");
    h.codes.push("BBBBBB");
    let svc = &h.services;
    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();

    let first = svc.magic_links.issue(identity.id, MagicLinkPurpose::SignIn).await.unwrap();
    let second = svc.magic_links.issue(identity.id, MagicLinkPurpose::SignIn).await.unwrap();

    assert_eq!(first.code, "AAAAAA");
    assert_eq!(second.code, "BBBBBB");
}

/// Never sees an existing code, so every collision surfaces at insert time.
struct BlindPrecheck(Arc<dyn MagicLinksRepository>);

#[async_trait]
impl MagicLinksRepository for BlindPrecheck {
    async fn code_exists(&self, _code: &str) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn insert(&self, link: MagicLink) -> Result<MagicLink, DomainError> {
        self.0.insert(link).await
    }

    async fn take_active(
        &self,
        code: &str,
        now: OffsetDateTime,
    ) -> Result<Option<MagicLink>, DomainError> {
        self.0.take_active(code, now).await
    }

    async fn delete_stale(&self, now: OffsetDateTime) -> Result<u64, DomainError> {
        self.0.delete_stale(now).await
    }
}

fn insert_race_service(h: &Harness, max_attempts: u32) -> MagicLinkService {
    MagicLinkService::new(
        Arc::new(BlindPrecheck(repositories(&h.db).magic_links)),
        Arc::clone(&h.codes) as Arc<dyn CodeSource>,
        Arc::clone(&h.clock) as Arc<dyn Clock>,
        Duration::minutes(15),
        max_attempts,
    )
}

#[tokio::test]
async fn insert_conflict_is_redrawn() {
    let h = Harness::new().await;
    for code in ["AAAAAA", "AAAAAA", "BBBBBB"] {
        h.codes.push(code);
    }
    let identity = h.services.identities.find_or_create("a@x.com").await.unwrap();
    let links = insert_race_service(&h, 3);

    let first = links.issue(identity.id, MagicLinkPurpose::SignIn).await.unwrap();
    let second = links.issue(identity.id, MagicLinkPurpose::SignIn).await.unwrap();

    assert_eq!(first.code, "AAAAAA");
    assert_eq!(second.code, "BBBBBB");
}

#[tokio::test]
async fn insert_conflicts_exhaust_generation() {
    let h = Harness::new().await;
    for _ in 0..4 {
        h.codes.push("SAME00");
    }
    let identity = h.services.identities.find_or_create("a@x.com").await.unwrap();
    let links = insert_race_service(&h, 3);
    links.issue(identity.id, MagicLinkPurpose::SignIn).await.unwrap();

    let err = links
        .issue(identity.id, MagicLinkPurpose::SignIn)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::GenerationExhausted { attempts: 3 }));
}

#[tokio::test]
#[traced_test]
async fn exhausted_generation_fails_and_alerts() {
    let config = ServiceConfig {
        max_generation_attempts: 3,
        ..ServiceConfig::default()
    };
    let h = Harness::with_config(&config).await;
    for _ in 0..4 {
        h.codes.push("SAME00");
    }
    let svc = &h.services;
    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();
    svc.magic_links.issue(identity.id, MagicLinkPurpose::SignIn).await.unwrap();

    let err = svc
        .magic_links
        .issue(identity.id, MagicLinkPurpose::SignIn)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::GenerationExhausted { attempts: 3 }));
    assert!(logs_contain("code generation exhausted"));
}

#[tokio::test]
async fn failed_delivery_does_not_undo_issuance() {
    let db = inmem_db().await;
    let clock = Arc::new(ManualClock::default());
    let codes = Arc::new(ScriptedCodes::new(["MA1K00"]));
    let services = AppServices::new(
        repositories(&db),
        Collaborators {
            clock: clock as Arc<dyn Clock>,
            codes: codes as Arc<dyn CodeSource>,
            mailer: Arc::new(FailingMailer),
        },
        SessionTokens::new(&SecretString::from(TEST_SECRET.to_owned())),
        &ServiceConfig::default(),
    );

    let identity = services.identities.find_or_create("a@x.com").await.unwrap();
    services
        .identities
        .issue_magic_link(&identity, MagicLinkPurpose::SignIn)
        .await
        .unwrap();
    tokio::task::yield_now().await;

    let link = services.magic_links.consume("MA1K00").await.unwrap();
    assert_eq!(link.identity_id, identity.id);
}

// --- sessions -------------------------------------------------------------

#[tokio::test]
async fn terminated_session_cannot_resume() {
    let h = Harness::new().await;
    let svc = &h.services;
    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();
    let signed_in = svc
        .sessions
        .start(identity, ClientInfo::default())
        .await
        .unwrap();

    let ctx = svc.sessions.resume(&signed_in.token).await.unwrap().unwrap();
    assert!(ctx.user.is_none());

    svc.sessions.terminate(&ctx).await.unwrap();
    assert!(svc.sessions.resume(&signed_in.token).await.unwrap().is_none());
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let h = Harness::new().await;
    let svc = &h.services;
    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();
    let signed_in = svc
        .sessions
        .start(identity, ClientInfo::default())
        .await
        .unwrap();

    let mut forged = signed_in.token.clone();
    forged.push('x');
    assert!(svc.sessions.resume(&forged).await.unwrap().is_none());
    assert!(svc.sessions.resume("garbage").await.unwrap().is_none());
}

#[tokio::test]
async fn session_records_bounded_client_info() {
    let h = Harness::new().await;
    let svc = &h.services;
    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();
    let signed_in = svc
        .sessions
        .start(
            identity,
            ClientInfo {
                ip_address: Some("203.0.113.9".to_owned()),
                user_agent: Some("x".repeat(900)),
            },
        )
        .await
        .unwrap();

    let session = &signed_in.context.session;
    assert_eq!(session.ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(session.user_agent.as_ref().map(String::len), Some(500));
}

// --- tenants --------------------------------------------------------------

#[tokio::test]
async fn sign_up_completion_binds_owner_with_trial() {
    let h = Harness::new().await;
    let (_, ctx) = onboarded(&h, "a@x.com").await;

    let user = ctx.user.as_ref().unwrap();
    let sub = ctx.subscription.as_ref().unwrap();
    assert_eq!(user.role, Role::Owner);
    assert_eq!(ctx.account.as_ref().unwrap().name, "Acme");
    assert_eq!(sub.status, SubscriptionStatus::Trialing);
    assert_eq!(sub.seat_limit, 1);
    assert_eq!(sub.seats_used, 1);
    assert_eq!(sub.trial_ends_at, Some(h.clock.now() + Duration::days(14)));
    assert!(h.services.tenants.has_membership(ctx.identity.id).await.unwrap());
    assert_eq!(
        h.services.tenants.owner(&ctx).await.unwrap().map(|u| u.id),
        Some(user.id)
    );
}

#[tokio::test]
async fn blank_names_leave_no_partial_tenant() {
    let h = Harness::new().await;
    let svc = &h.services;
    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();

    for (account_name, owner_name) in [("", "Ann"), ("Acme", "  ")] {
        let err = svc
            .tenants
            .create_with_owner(account_name, &identity, owner_name)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
    assert_eq!(account::Entity::find().count(&h.db).await.unwrap(), 0);
    assert_eq!(user::Entity::find().count(&h.db).await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_seat_limit_is_rejected_before_storage() {
    let config = ServiceConfig {
        default_seat_limit: 0,
        ..ServiceConfig::default()
    };
    let h = Harness::with_config(&config).await;
    let identity = h.services.identities.find_or_create("a@x.com").await.unwrap();

    let err = h
        .services
        .tenants
        .create_with_owner("Acme", &identity, "Ann")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "seat_limit"));
    assert_eq!(account::Entity::find().count(&h.db).await.unwrap(), 0);
}

#[tokio::test]
async fn member_is_denied_member_management() {
    let h = Harness::new().await;
    let (_, owner_ctx) = onboarded(&h, "owner@x.com").await;
    let member_ctx = add_member(&h, &owner_ctx, "member@x.com", Role::Member).await;
    let owner_id = owner_ctx.user.as_ref().unwrap().id;

    assert_eq!(member_ctx.account, owner_ctx.account);
    let err = h
        .services
        .tenants
        .deactivate_member(&member_ctx, owner_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Denied(DenialReason::InsufficientRole)
    ));
}

#[tokio::test]
async fn admin_cannot_deactivate_owner_but_can_deactivate_member() {
    let h = Harness::new().await;
    let (_, owner_ctx) = onboarded(&h, "owner@x.com").await;
    let admin_ctx = add_member(&h, &owner_ctx, "admin@x.com", Role::Admin).await;
    let member_ctx = add_member(&h, &owner_ctx, "member@x.com", Role::Member).await;
    let tenants = &h.services.tenants;

    let err = tenants
        .deactivate_member(&admin_ctx, owner_ctx.user.as_ref().unwrap().id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Denied(DenialReason::CannotManage)));

    let target = member_ctx.user.as_ref().unwrap().id;
    let updated = tenants.deactivate_member(&admin_ctx, target).await.unwrap();
    assert!(!updated.active);
    assert!(updated.identity_id.is_none());

    // The deactivated identity no longer resolves to the account.
    let resumed = h
        .services
        .sessions
        .resume(&token_for(&member_ctx))
        .await
        .unwrap()
        .unwrap();
    assert!(resumed.user.is_none());
}

#[tokio::test]
async fn members_of_other_accounts_are_not_found() {
    let h = Harness::new().await;
    let (_, acme) = onboarded(&h, "owner@acme.com").await;
    let (_, other) = onboarded(&h, "owner@other.com").await;
    let outsider = add_member(&h, &other, "m@other.com", Role::Member).await;

    let err = h
        .services
        .tenants
        .deactivate_member(&acme, outsider.user.as_ref().unwrap().id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert_eq!(h.services.tenants.members(&acme).await.unwrap().len(), 1);
}

// --- gates over live contexts ---------------------------------------------

#[tokio::test]
async fn past_due_blocks_writes_and_trialing_allows_them() {
    let h = Harness::new().await;
    let (_, ctx) = onboarded(&h, "a@x.com").await;
    let articles = &h.services.articles;
    let draft = || NewArticle {
        title: "Hello".to_owned(),
        body: "World".to_owned(),
        published: false,
    };

    assert!(articles.create(&ctx, draft()).await.is_ok());

    let past_due = set_status(&h, &ctx, SubscriptionStatus::PastDue).await;
    let err = articles.create(&past_due, draft()).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Denied(DenialReason::InactiveSubscription)
    ));
    assert_eq!(articles.list(&past_due).await.unwrap().len(), 1);
}

#[tokio::test]
async fn identity_without_account_is_sent_to_setup() {
    let h = Harness::new().await;
    let svc = &h.services;
    let identity = svc.identities.find_or_create("a@x.com").await.unwrap();
    let ctx = svc
        .sessions
        .start(identity, ClientInfo::default())
        .await
        .unwrap()
        .context;

    let err = svc.articles.list(&ctx).await.unwrap_err();
    assert!(matches!(err, DomainError::Denied(DenialReason::NoAccount)));
}

// --- rate limiting --------------------------------------------------------

#[tokio::test]
async fn eleventh_sign_up_request_in_window_is_denied() {
    let h = Harness::new().await;
    let limiter = &h.services.limiter;

    for _ in 0..10 {
        limiter.check("198.51.100.7", Endpoint::SignUp).unwrap();
    }
    assert!(matches!(
        limiter.check("198.51.100.7", Endpoint::SignUp),
        Err(DomainError::RateLimited)
    ));

    h.clock.advance(Duration::minutes(3));
    assert!(limiter.check("198.51.100.7", Endpoint::SignUp).is_ok());
}

// --- articles -------------------------------------------------------------

#[tokio::test]
async fn article_lifecycle() {
    let h = Harness::new().await;
    let (_, ctx) = onboarded(&h, "a@x.com").await;
    let articles = &h.services.articles;

    let first = articles
        .create(
            &ctx,
            NewArticle {
                title: "First".to_owned(),
                body: "Body".to_owned(),
                published: false,
            },
        )
        .await
        .unwrap();
    h.clock.advance(Duration::seconds(1));
    let second = articles
        .create(
            &ctx,
            NewArticle {
                title: "Second".to_owned(),
                body: "Body".to_owned(),
                published: true,
            },
        )
        .await
        .unwrap();
    assert!(second.published_at.is_some());
    assert_eq!(first.user_id, ctx.user.as_ref().unwrap().id);

    let listed: Vec<_> = articles
        .list(&ctx)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(listed, vec![second.id, first.id]);

    let published = articles.publish(&ctx, first.id).await.unwrap();
    assert!(published.published);
    assert_eq!(published.published_at, Some(h.clock.now()));

    let unpublished = articles.unpublish(&ctx, first.id).await.unwrap();
    assert!(!unpublished.published);
    assert!(unpublished.published_at.is_none());

    let patched = articles
        .update(
            &ctx,
            first.id,
            ArticlePatch {
                title: Some("Renamed".to_owned()),
                ..ArticlePatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.title, "Renamed");
    assert_eq!(articles.get(&ctx, first.id).await.unwrap().title, "Renamed");

    let err = articles
        .update(
            &ctx,
            first.id,
            ArticlePatch {
                body: Some(" ".to_owned()),
                ..ArticlePatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    articles.delete(&ctx, first.id).await.unwrap();
    assert!(matches!(
        articles.get(&ctx, first.id).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[tokio::test]
async fn articles_are_scoped_to_the_account() {
    let h = Harness::new().await;
    let (_, acme) = onboarded(&h, "a@acme.com").await;
    let (_, other) = onboarded(&h, "b@other.com").await;
    let article = h
        .services
        .articles
        .create(
            &acme,
            NewArticle {
                title: "Private".to_owned(),
                body: "Body".to_owned(),
                published: false,
            },
        )
        .await
        .unwrap();

    let err = h.services.articles.get(&other, article.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert!(h.services.articles.delete(&other, article.id).await.is_err());
    assert!(h.services.articles.list(&other).await.unwrap().is_empty());
}
