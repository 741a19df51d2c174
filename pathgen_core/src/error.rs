//! Error types for pathgen_core operations.

use core::fmt;

/// Errors that can occur in partition and coordinate math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Partition parameters are unusable.
    InvalidPartition {
        /// Description of the invalid parameter.
        message: &'static str,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidPartition { message } => {
                write!(f, "invalid partition: {}", message)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}

/// Result type alias for pathgen_core operations.
pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidPartition {
            message: "pixels per cell must be >= 1",
        };
        assert!(std::format!("{}", err).contains("pixels per cell"));
    }
}
