use thiserror::Error;

/// Error types for the peakinit-rs library.
#[derive(Error, Debug)]
pub enum PeakInitError {
    /// Error indicating a mismatch in array dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error for invalid approximation intervals or orders.
    #[error("Invalid interval: [{start}, {end}]")]
    InvalidInterval { start: f64, end: f64 },

    /// Parameter not found.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// Error for parameter-related problems.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// Error during function evaluation.
    #[error("Function evaluation error: {0}")]
    FunctionEvaluation(String),

    /// Adaptive splitting exceeded its maximum recursion depth.
    #[error("Adaptive splitting gave up after {depth} levels on [{start}, {end}]")]
    RecursionExhausted { start: f64, end: f64, depth: usize },

    /// The scaled Newton system has a zero curvature entry or cannot be solved.
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// An operation that the receiver does not support.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A minimizer was used before a cost function was attached.
    #[error("Minimizer is not initialized")]
    NotInitialized,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

impl From<crate::parameters::parameter::ParameterError> for PeakInitError {
    fn from(err: crate::parameters::parameter::ParameterError) -> Self {
        match err {
            crate::parameters::parameter::ParameterError::ParameterNotFound { name } => {
                PeakInitError::ParameterNotFound(name)
            }
            other => PeakInitError::ParameterError(format!("{}", other)),
        }
    }
}

/// Result type alias for peakinit-rs operations.
pub type Result<T> = std::result::Result<T, PeakInitError>;

impl From<String> for PeakInitError {
    fn from(s: String) -> Self {
        PeakInitError::Other(s)
    }
}

impl From<&str> for PeakInitError {
    fn from(s: &str) -> Self {
        PeakInitError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::parameter::ParameterError;

    #[test]
    fn test_error_display() {
        let err = PeakInitError::DimensionMismatch("expected 3 values, got 2".to_string());
        assert!(format!("{}", err).contains("expected 3 values, got 2"));

        let err = PeakInitError::RecursionExhausted {
            start: -1.0,
            end: 1.0,
            depth: 10,
        };
        assert!(format!("{}", err).contains("10 levels"));
    }

    #[test]
    fn test_error_conversion() {
        let err: PeakInitError = ParameterError::ParameterNotFound {
            name: "Sigma".to_string(),
        }
        .into();
        match err {
            PeakInitError::ParameterNotFound(name) => assert_eq!(name, "Sigma"),
            _ => panic!("Expected ParameterNotFound variant"),
        }

        let str_err: PeakInitError = "test error".into();
        match str_err {
            PeakInitError::Other(s) => assert_eq!(s, "test error"),
            _ => panic!("Expected Other variant"),
        }
    }
}
