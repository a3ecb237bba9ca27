//! Domain service layer.
//!
//! One service per concern, wired together by [`AppServices`]:
//! - `identities` - identity registry and code issuance entry point
//! - `magic_links` - code generation, consumption and sweeping
//! - `sessions` - session tokens and request context resolution
//! - `tenants` - account creation and member management
//! - `articles` - the account-scoped resource behind the gate pipeline
//!
//! Services depend on repository traits only and never on `api::*`.

use std::sync::Arc;

use time::Duration;

use crate::config::PassportConfig;
use crate::domain::clock::Clock;
use crate::domain::code::CodeSource;
use crate::domain::error::DomainError;
use crate::domain::ports::MagicLinkMailer;
use crate::domain::rate_limit::RateLimiter;
use crate::domain::repos::{
    ArticlesRepository, IdentitiesRepository, MagicLinksRepository, SessionsRepository,
    TenantsRepository,
};
use crate::domain::token::SessionTokens;

mod articles;
mod identities;
mod magic_links;
mod sessions;
mod tenants;

pub use articles::ArticleService;
pub use identities::{IdentityService, normalize_email};
pub use magic_links::MagicLinkService;
pub use sessions::SessionService;
pub use tenants::TenantService;

#[cfg(test)]
mod service_test;

/// Service-level settings derived from [`PassportConfig`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub magic_link_ttl: Duration,
    pub max_generation_attempts: u32,
    pub user_agent_max_len: usize,
    pub trial_period: Duration,
    pub default_seat_limit: i32,
    pub rate_limit_attempts: u32,
    pub rate_limit_window: std::time::Duration,
}

impl ServiceConfig {
    #[must_use]
    pub fn from_config(cfg: &PassportConfig) -> Self {
        Self {
            magic_link_ttl: to_time(cfg.magic_link.ttl),
            max_generation_attempts: cfg.magic_link.max_generation_attempts,
            user_agent_max_len: cfg.session.user_agent_max_len,
            trial_period: to_time(cfg.tenancy.trial_period),
            default_seat_limit: cfg.tenancy.default_seat_limit,
            rate_limit_attempts: cfg.rate_limit.max_attempts,
            rate_limit_window: cfg.rate_limit.window,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_config(&PassportConfig::default())
    }
}

fn to_time(d: std::time::Duration) -> Duration {
    Duration::try_from(d).unwrap_or(Duration::MAX)
}

/// Repository set handed to [`AppServices::new`].
#[derive(Clone)]
pub struct Repositories {
    pub identities: Arc<dyn IdentitiesRepository>,
    pub magic_links: Arc<dyn MagicLinksRepository>,
    pub sessions: Arc<dyn SessionsRepository>,
    pub tenants: Arc<dyn TenantsRepository>,
    pub articles: Arc<dyn ArticlesRepository>,
}

/// Pluggable collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub codes: Arc<dyn CodeSource>,
    pub mailer: Arc<dyn MagicLinkMailer>,
}

// DI Container - aggregates all domain services
#[derive(Clone)]
pub struct AppServices {
    pub identities: Arc<IdentityService>,
    pub magic_links: Arc<MagicLinkService>,
    pub sessions: Arc<SessionService>,
    pub tenants: Arc<TenantService>,
    pub articles: Arc<ArticleService>,
    pub limiter: Arc<RateLimiter>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        repos: Repositories,
        parts: Collaborators,
        tokens: SessionTokens,
        config: &ServiceConfig,
    ) -> Self {
        let Collaborators {
            clock,
            codes,
            mailer,
        } = parts;

        let magic_links = Arc::new(MagicLinkService::new(
            repos.magic_links,
            codes,
            Arc::clone(&clock),
            config.magic_link_ttl,
            config.max_generation_attempts,
        ));
        let identities = Arc::new(IdentityService::new(
            Arc::clone(&repos.identities),
            Arc::clone(&magic_links),
            mailer,
            Arc::clone(&clock),
        ));
        let sessions = Arc::new(SessionService::new(
            repos.sessions,
            repos.identities,
            Arc::clone(&repos.tenants),
            tokens,
            Arc::clone(&clock),
            config.user_agent_max_len,
        ));
        let tenants = Arc::new(TenantService::new(
            repos.tenants,
            Arc::clone(&clock),
            config.trial_period,
            config.default_seat_limit,
        ));
        let articles = Arc::new(ArticleService::new(repos.articles, Arc::clone(&clock)));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_attempts,
            config.rate_limit_window,
            clock,
        ));

        Self {
            identities,
            magic_links,
            sessions,
            tenants,
            articles,
            limiter,
        }
    }

    /// Purges expired links and evicts elapsed rate-limit windows.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn cleanup(&self) -> Result<CleanupReport, DomainError> {
        let magic_links = self.magic_links.cleanup().await?;
        let rate_windows = self.limiter.evict_elapsed();
        Ok(CleanupReport {
            magic_links,
            rate_windows,
        })
    }
}

/// What a cleanup sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub magic_links: u64,
    pub rate_windows: usize,
}

/// Trims `value` and rejects blank input.
fn validate_text(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "can't be blank"));
    }
    Ok(trimmed.to_owned())
}
