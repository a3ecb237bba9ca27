//! Passport module: passwordless authentication, sessions and tenant access
//! control.
//!
//! The public contract lives in `passport-sdk` and is re-exported here.
//! [`Passport`] assembles storage, services and the REST router; embedders
//! that stay in-process use [`Passport::local_client`].

pub use passport_sdk::{
    AuthContext, ClientInfo, DenialReason, PassportApi, PassportError, SignedIn,
};

pub mod config;
pub use config::PassportConfig;

pub mod module;
pub use module::{Passport, PassportBuilder};

pub mod local_client;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

pub use domain::ports::{MagicLinkMailer, MagicLinkMessage};
pub use domain::service::CleanupReport;
pub use infra::storage::db::{connect, migrate};
pub use sea_orm::DatabaseConnection;
