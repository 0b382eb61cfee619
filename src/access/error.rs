//! Policy construction errors.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors that prevent a policy from being built. Evaluation itself never fails.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The configuration failed semantic validation.
    #[error("invalid filter configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

impl From<Vec<ValidationError>> for PolicyError {
    fn from(errors: Vec<ValidationError>) -> Self {
        PolicyError::Invalid(errors)
    }
}

impl From<ValidationError> for PolicyError {
    fn from(error: ValidationError) -> Self {
        PolicyError::Invalid(vec![error])
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
