pub mod errors;
pub mod db;
pub mod restaurant;
pub mod user;
pub mod review;
pub mod deleted_review;
pub mod manager_response;
pub mod error_report;
