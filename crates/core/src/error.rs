// Central Error Type for the Application

use crate::domain::{SchemaVersion, ValidationError};
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Input failed a pre-storage invariant check. Never opens a transaction.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A keyed operation targeted an id that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store rejected an operation, or a storage invariant was violated
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Migration failed: {0}")]
    Migration(#[from] MigrationFailure),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

/// A forward migration step failed.
///
/// `rollback_error` is set only when the compensating rollback was attempted and
/// failed as well; in that case the store needs manual attention.
#[derive(Debug)]
pub struct MigrationFailure {
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    pub error: Box<AppError>,
    pub rollback_error: Option<Box<AppError>>,
}

impl MigrationFailure {
    pub fn new(from: SchemaVersion, to: SchemaVersion, error: AppError) -> Self {
        Self {
            from,
            to,
            error: Box::new(error),
            rollback_error: None,
        }
    }

    pub fn with_rollback_error(mut self, rollback_error: AppError) -> Self {
        self.rollback_error = Some(Box::new(rollback_error));
        self
    }

    pub fn rollback_failed(&self) -> bool {
        self.rollback_error.is_some()
    }
}

impl std::fmt::Display for MigrationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step v{}->v{}: {}", self.from, self.to, self.error)?;
        if let Some(rollback_error) = &self.rollback_error {
            write!(f, "; rollback also failed: {}", rollback_error)?;
        }
        Ok(())
    }
}

impl std::error::Error for MigrationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_failure_renders_both_errors() {
        let failure = MigrationFailure::new(3, 4, AppError::Persistence("disk I/O".into()))
            .with_rollback_error(AppError::Persistence("table locked".into()));

        let message = AppError::from(failure).to_string();
        assert!(message.contains("v3->v4"));
        assert!(message.contains("disk I/O"));
        assert!(message.contains("rollback also failed"));
        assert!(message.contains("table locked"));
    }

    #[test]
    fn test_validation_conversion() {
        let err: AppError = ValidationError::UnknownTrend("up".into()).into();
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }
}
