//! Wiring: storage, collaborators and services assembled into one handle.

use std::sync::Arc;

use axum::Router;
use passport_sdk::PassportApi;
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::api::rest::RestState;
use crate::api::rest::cookie::CookieSettings;
use crate::api::rest::routes;
use crate::config::{ConfigError, PassportConfig};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::code::{CodeSource, RandomCodeSource};
use crate::domain::error::DomainError;
use crate::domain::ports::MagicLinkMailer;
use crate::domain::service::{AppServices, CleanupReport, Collaborators, ServiceConfig};
use crate::domain::token::SessionTokens;
use crate::infra::mail::TracingMailer;
use crate::infra::storage::orm_repositories;
use crate::local_client::LocalClient;

/// The assembled passport module.
pub struct Passport {
    services: AppServices,
    rest: Arc<RestState>,
}

impl Passport {
    /// Starts a builder over an already migrated connection.
    #[must_use]
    pub fn builder(db: DatabaseConnection) -> PassportBuilder {
        PassportBuilder {
            db,
            clock: Arc::new(SystemClock),
            codes: Arc::new(RandomCodeSource),
            mailer: Arc::new(TracingMailer),
        }
    }

    /// Default wiring: system clock, random codes, tracing mailer.
    ///
    /// # Errors
    /// `ConfigError` when the config fails validation.
    pub fn new(db: DatabaseConnection, config: &PassportConfig) -> Result<Self, ConfigError> {
        Self::builder(db).build(config)
    }

    /// REST routes with request tracing.
    #[must_use]
    pub fn router(&self) -> Router {
        routes::register_routes(Router::new(), Arc::clone(&self.rest))
            .layer(TraceLayer::new_for_http())
    }

    #[must_use]
    pub fn local_client(&self) -> Arc<dyn PassportApi> {
        Arc::new(LocalClient::new(self.services.clone()))
    }

    /// Runs one maintenance sweep.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn cleanup(&self) -> Result<CleanupReport, DomainError> {
        self.services.cleanup().await
    }

    #[must_use]
    pub fn services(&self) -> &AppServices {
        &self.services
    }
}

/// Swaps collaborators before the services are built.
pub struct PassportBuilder {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeSource>,
    mailer: Arc<dyn MagicLinkMailer>,
}

impl PassportBuilder {
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = codes;
        self
    }

    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn MagicLinkMailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// # Errors
    /// `ConfigError` when the config fails validation.
    pub fn build(self, config: &PassportConfig) -> Result<Passport, ConfigError> {
        config.validate()?;

        let services = AppServices::new(
            orm_repositories(&self.db),
            Collaborators {
                clock: self.clock,
                codes: self.codes,
                mailer: self.mailer,
            },
            SessionTokens::new(&config.session.secret),
            &ServiceConfig::from_config(config),
        );

        let rest = Arc::new(RestState {
            services: services.clone(),
            cookies: CookieSettings {
                name: config.session.cookie_name.clone(),
                secure: config.session.cookie_secure,
            },
            reveal_codes: config.magic_link.reveal_codes,
            trust_forwarded_for: config.rate_limit.trust_forwarded_for,
        });

        tracing::info!(
            reveal_codes = config.magic_link.reveal_codes,
            "passport module initialized"
        );
        Ok(Passport { services, rest })
    }
}
