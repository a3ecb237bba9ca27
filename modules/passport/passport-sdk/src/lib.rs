//! Passport SDK
//!
//! Public contract of the passport module: the [`PassportApi`] trait, the
//! identity / tenancy models it speaks in, and [`PassportError`].

pub mod api;
pub mod errors;
pub mod models;

pub use api::{ClientInfo, PassportApi, SignedIn};
pub use errors::{DenialReason, PassportError, UnknownVariant};
pub use models::{
    Account, Article, ArticlePatch, AuthContext, Identity, MagicLink, MagicLinkPurpose, NewArticle,
    NewTenant, Plan, Role, Session, Subscription, SubscriptionStatus, Tenant, User,
};
