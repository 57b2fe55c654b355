//! Error types for the MLP trainer.

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, MlpError>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum MlpError {
    /// Activation identifier not recognized
    #[error("unknown activation function: {0:?}")]
    UnknownActivation(String),

    /// Loss identifier not recognized
    #[error("there is no predefined loss function named {0:?}")]
    UnknownLoss(String),

    /// Configuration value out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A vector or matrix had the wrong length
    #[error("{context}: bad dimensions, got length {actual}, expected {expected}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A layer operation was invoked out of order within a training step
    #[error("cannot {operation} while layer is {state}")]
    LayerOrder {
        operation: &'static str,
        state: &'static str,
    },

    /// A label outside the class range
    #[error("label {label} out of range for {num_classes} classes")]
    InvalidLabel { label: usize, num_classes: usize },

    /// A split or file without examples
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    /// Malformed dataset record
    #[error("failed to parse data: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MlpError {
    /// Shorthand for a [`MlpError::DimensionMismatch`].
    pub fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// True for errors raised while resolving the network configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownActivation(_) | Self::UnknownLoss(_) | Self::InvalidConfig(_)
        )
    }
}
