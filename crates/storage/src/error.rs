use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}
