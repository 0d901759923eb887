use std::fmt;

/// Result type for Pallas operations
pub type Result<T> = std::result::Result<T, PallasError>;

/// Main error type for the Pallas library
#[derive(Debug, Clone, PartialEq)]
pub enum PallasError {
    /// Invalid architecture name or constructor argument
    Configuration {
        name: String,
        reason: String,
    },

    /// `select_action` called on a policy that does not implement it
    UnimplementedPolicy(String),

    /// Input shape disagrees with the model or policy
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Action index outside the action space
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// Degenerate distribution parameters
    NumericalError(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for PallasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PallasError::Configuration { name, reason } => {
                write!(f, "Invalid configuration '{}': {}", name, reason)
            }
            PallasError::UnimplementedPolicy(policy) => {
                write!(f, "select_action is not implemented for {}", policy)
            }
            PallasError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            PallasError::InvalidAction { action, max_actions } => {
                write!(f, "Invalid action {}: must be less than {}", action, max_actions)
            }
            PallasError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            PallasError::IoError(msg) => write!(f, "IO error: {}", msg),
            PallasError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for PallasError {}

impl From<std::io::Error> for PallasError {
    fn from(err: std::io::Error) -> Self {
        PallasError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for PallasError {
    fn from(err: serde_json::Error) -> Self {
        PallasError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PallasError {
    fn from(err: ndarray::ShapeError) -> Self {
        PallasError::DimensionMismatch {
            expected: "a compatible array layout".to_string(),
            actual: err.to_string(),
        }
    }
}

// Helper functions for common error patterns
impl PallasError {
    pub fn configuration<S: Into<String>>(name: S, reason: S) -> Self {
        PallasError::Configuration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        PallasError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
