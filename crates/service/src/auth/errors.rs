use thiserror::Error;

/// Failures of registration, login and token resolution.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("email already registered")]
    Conflict,
    #[error("account not found")]
    NotFound,
    #[error("invalid email or password")]
    Unauthorized,
    #[error("account blocked: {0}")]
    Blocked(String),
    #[error("password hashing failed: {0}")]
    HashError(String),
    #[error("invalid token: {0}")]
    TokenError(String),
    #[error("user store failure: {0}")]
    Repository(String),
}

impl AuthError {
    /// Numeric code attached to auth failure logs.
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::Blocked(_) => 1005,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}
