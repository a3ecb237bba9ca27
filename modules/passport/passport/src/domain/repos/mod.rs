//! Persistence ports. Implementations live in `infra::storage`.

mod articles_repo;
mod identities_repo;
mod magic_links_repo;
mod sessions_repo;
mod tenants_repo;

pub use articles_repo::ArticlesRepository;
pub use identities_repo::IdentitiesRepository;
pub use magic_links_repo::MagicLinksRepository;
pub use sessions_repo::SessionsRepository;
pub use tenants_repo::TenantsRepository;
