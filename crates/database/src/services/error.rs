use models::validation::DurationError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),

    /// The request was understood but breaks a business rule
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    PermissionDenied(&'static str),

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),
}

impl From<DurationError> for ServiceError {
    fn from(err: DurationError) -> Self {
        Self::Validation(err.to_string())
    }
}
