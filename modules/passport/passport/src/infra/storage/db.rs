use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use sea_orm_migration::MigratorTrait;
use time::{Duration, OffsetDateTime};

use super::migrations::Migrator;
use crate::domain::error::DomainError;

pub fn db_err(e: DbErr) -> DomainError {
    DomainError::database(e.to_string())
}

/// Maps a unique-index violation to `DomainError::Conflict`, anything else
/// to a storage error.
pub fn insert_err(what: &'static str) -> impl Fn(DbErr) -> DomainError {
    move |e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict { what },
        _ => db_err(e),
    }
}

/// Drops the sub-second part. Timestamps that are range-compared in queries
/// must all share this precision: SQLite compares them as RFC 3339 text.
#[must_use]
pub fn whole_seconds(at: OffsetDateTime) -> OffsetDateTime {
    at - Duration::nanoseconds(i64::from(at.nanosecond()))
}

/// Opens a pool for `dsn`.
///
/// # Errors
/// Connection failures.
pub async fn connect(dsn: &str, max_conns: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(dsn.to_owned());
    opts.max_connections(max_conns).sqlx_logging(false);
    // Each in-memory SQLite connection is its own database.
    if dsn.starts_with("sqlite::memory:") {
        opts.max_connections(1).min_connections(1);
    }
    Database::connect(opts).await
}

/// Applies pending migrations.
///
/// # Errors
/// Migration failures.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}
