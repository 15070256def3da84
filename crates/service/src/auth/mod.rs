//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and bearer-token resolution live here; the HTTP layer
//! only extracts the token and maps errors.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
