#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use secrecy::SecretString;
use time::OffsetDateTime;
use tokio::sync::mpsc;

use super::db;
use crate::domain::clock::{Clock, ManualClock};
use crate::domain::code::{CodeSource, RandomCodeSource};
use crate::domain::ports::{MagicLinkMailer, MagicLinkMessage};
use crate::domain::service::{AppServices, Collaborators, Repositories, ServiceConfig};
use crate::domain::token::SessionTokens;

pub const TEST_SECRET: &str = "test-secret-test-secret-test-secret!";

pub async fn inmem_db() -> DatabaseConnection {
    let db = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to connect to in-memory database");
    db::migrate(&db).await.expect("Failed to run migrations");
    db
}

#[must_use]
pub fn repositories(db: &DatabaseConnection) -> Repositories {
    super::orm_repositories(db)
}

/// Replays scripted candidates, then falls back to random draws.
#[derive(Default)]
pub struct ScriptedCodes {
    script: Mutex<VecDeque<String>>,
}

impl ScriptedCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }

    pub fn push(&self, code: &str) {
        self.script.lock().push_back(code.to_owned());
    }
}

impl CodeSource for ScriptedCodes {
    fn candidate(&self) -> String {
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| RandomCodeSource.candidate())
    }
}

/// Mailer that forwards every message to a channel.
pub struct RecordingMailer {
    tx: mpsc::UnboundedSender<MagicLinkMessage>,
}

impl RecordingMailer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MagicLinkMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MagicLinkMailer for RecordingMailer {
    async fn deliver(&self, message: MagicLinkMessage) -> anyhow::Result<()> {
        self.tx.send(message)?;
        Ok(())
    }
}

/// Mailer whose transport is always down.
pub struct FailingMailer;

#[async_trait]
impl MagicLinkMailer for FailingMailer {
    async fn deliver(&self, _message: MagicLinkMessage) -> anyhow::Result<()> {
        anyhow::bail!("smtp unreachable")
    }
}

/// Fully wired services over a fresh in-memory database.
pub struct Harness {
    pub db: DatabaseConnection,
    pub services: AppServices,
    pub clock: Arc<ManualClock>,
    pub codes: Arc<ScriptedCodes>,
    pub outbox: mpsc::UnboundedReceiver<MagicLinkMessage>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(&ServiceConfig::default()).await
    }

    pub async fn with_config(config: &ServiceConfig) -> Self {
        let db = inmem_db().await;
        let start = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let codes = Arc::new(ScriptedCodes::default());
        let (mailer, outbox) = RecordingMailer::new();

        let services = AppServices::new(
            repositories(&db),
            Collaborators {
                clock: Arc::clone(&clock) as Arc<dyn Clock>,
                codes: Arc::clone(&codes) as Arc<dyn CodeSource>,
                mailer: Arc::new(mailer),
            },
            SessionTokens::new(&SecretString::from(TEST_SECRET.to_owned())),
            config,
        );

        Self {
            db,
            services,
            clock,
            codes,
            outbox,
        }
    }
}
