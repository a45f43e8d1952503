//! Error taxonomy for configuring and launching a strategy

use std::fmt;
use thiserror::Error;

use crate::pipeline::Stage;
use crate::types::OrderVariant;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    /// Wire name of the offending field
    pub field: String,
    /// Human-readable reason
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_field(name: &str) -> Self {
        Self::new(name, "unknown parameter")
    }

    pub fn not_applicable(field: impl Into<String>, variant: OrderVariant) -> Self {
        Self::new(field, format!("is not a parameter of {} orders", variant))
    }
}

/// Every field error found in one validation pass (never empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Wrap a list of errors; `None` when the list is empty
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether any error refers to `field`
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Failure of a single remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response body is not JSON: {0}")]
    InvalidBody(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Errors surfaced to the operator when configuring or submitting
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LaunchError {
    #[error("configuration is invalid: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("no order type selected")]
    NoVariantSelected,

    #[error("a submission is already in progress")]
    SubmissionInProgress,

    #[error("{stage} failed: {cause}")]
    RemoteCallFailed {
        stage: Stage,
        #[source]
        cause: RemoteError,
    },
}

impl LaunchError {
    /// Pipeline stage the failure belongs to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            LaunchError::Validation(_) => Some(Stage::Validating),
            LaunchError::RemoteCallFailed { stage, .. } => Some(*stage),
            LaunchError::NoVariantSelected | LaunchError::SubmissionInProgress => None,
        }
    }

    /// True when `/update_params` succeeded but `/start` did not, so the
    /// backend holds the new parameters while the strategy is not running.
    pub fn parameters_applied(&self) -> bool {
        matches!(
            self,
            LaunchError::RemoteCallFailed {
                stage: Stage::Starting,
                ..
            }
        )
    }
}

impl From<FieldError> for LaunchError {
    fn from(error: FieldError) -> Self {
        LaunchError::Validation(ValidationErrors::single(error))
    }
}

pub type LaunchResult<T> = Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display_joins_fields() {
        let errors = ValidationErrors::from_vec(vec![
            FieldError::new("symbol", "must not be empty"),
            FieldError::new("sentimentConfidenceThreshold", "must be between 0 and 1"),
        ])
        .unwrap();

        assert_eq!(
            errors.to_string(),
            "symbol: must not be empty; sentimentConfidenceThreshold: must be between 0 and 1"
        );
        assert!(errors.contains("symbol"));
        assert!(!errors.contains("buyLimitMultiplier"));
    }

    #[test]
    fn test_empty_validation_errors_are_not_constructed() {
        assert!(ValidationErrors::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn test_parameters_applied_only_for_start_failures() {
        let start_failed = LaunchError::RemoteCallFailed {
            stage: Stage::Starting,
            cause: RemoteError::Transport("connection reset".to_string()),
        };
        let apply_failed = LaunchError::RemoteCallFailed {
            stage: Stage::ApplyingConfig,
            cause: RemoteError::Status {
                status: 500,
                body: "boom".to_string(),
            },
        };

        assert!(start_failed.parameters_applied());
        assert!(!apply_failed.parameters_applied());
        assert!(!LaunchError::SubmissionInProgress.parameters_applied());
        assert_eq!(apply_failed.stage(), Some(Stage::ApplyingConfig));
        assert_eq!(LaunchError::NoVariantSelected.stage(), None);
    }

    #[test]
    fn test_remote_failure_message_names_stage() {
        let err = LaunchError::RemoteCallFailed {
            stage: Stage::ApplyingConfig,
            cause: RemoteError::Status {
                status: 503,
                body: "unavailable".to_string(),
            },
        };

        assert_eq!(
            err.to_string(),
            "applying config (/update_params) failed: backend returned HTTP 503: unavailable"
        );
    }
}
