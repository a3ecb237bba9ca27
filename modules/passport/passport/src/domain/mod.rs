pub mod clock;
pub mod code;
mod context;
pub mod error;
pub mod gate;
pub mod ports;
pub mod rate_limit;
pub mod repos;
pub mod service;
pub mod token;
