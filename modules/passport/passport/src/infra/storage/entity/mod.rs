pub mod account;
pub mod article;
pub mod identity;
pub mod magic_link;
pub mod session;
pub mod subscription;
pub mod user;
