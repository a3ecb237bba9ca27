use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::domain::service::Repositories;

pub mod db;
pub mod entity;
pub mod mapper;
pub mod migrations;

mod articles_sea_repo;
mod identities_sea_repo;
mod magic_links_sea_repo;
mod sessions_sea_repo;
mod tenants_sea_repo;

pub use articles_sea_repo::OrmArticlesRepository;
pub use identities_sea_repo::OrmIdentitiesRepository;
pub use magic_links_sea_repo::OrmMagicLinksRepository;
pub use sessions_sea_repo::OrmSessionsRepository;
pub use tenants_sea_repo::OrmTenantsRepository;

#[cfg(test)]
pub mod test_support;

/// Wires every repository port to its sea-orm implementation.
#[must_use]
pub fn orm_repositories(db: &DatabaseConnection) -> Repositories {
    Repositories {
        identities: Arc::new(OrmIdentitiesRepository::new(db.clone())),
        magic_links: Arc::new(OrmMagicLinksRepository::new(db.clone())),
        sessions: Arc::new(OrmSessionsRepository::new(db.clone())),
        tenants: Arc::new(OrmTenantsRepository::new(db.clone())),
        articles: Arc::new(OrmArticlesRepository::new(db.clone())),
    }
}
