//! Service layer providing business operations on top of models.
//! - Separates business logic and role checks from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Multi-row changes run in one database transaction.

pub mod errors;
pub mod pagination;
pub mod access;
pub mod auth;
pub mod restaurant_service;
pub mod review_service;
pub mod manager_response_service;
pub mod error_report_service;
pub mod user_admin_service;
#[cfg(test)]
pub mod test_support;
