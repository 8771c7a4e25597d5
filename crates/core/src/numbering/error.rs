//! Numbering error types.

use thiserror::Error;

/// Errors that can occur while generating document numbers.
#[derive(Debug, Error)]
pub enum NumberingError {
    /// A stored document number could not be parsed.
    #[error("Malformed document number: {value}")]
    Malformed {
        /// The stored value that failed to parse.
        value: String,
    },

    /// Every allocation attempt lost the race to a concurrent writer.
    ///
    /// The whole creation operation is safe to retry.
    #[error("Could not allocate a unique document number after {attempts} attempts")]
    ConcurrencyConflict {
        /// How many attempts were made before giving up.
        attempts: u32,
    },

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl NumberingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "MALFORMED_DOCUMENT_NUMBER",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if the caller may retry the whole creation operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            NumberingError::Malformed {
                value: "X".to_string()
            }
            .error_code(),
            "MALFORMED_DOCUMENT_NUMBER"
        );
        assert_eq!(
            NumberingError::ConcurrencyConflict { attempts: 3 }.error_code(),
            "CONCURRENCY_CONFLICT"
        );
        assert_eq!(
            NumberingError::Storage("down".to_string()).error_code(),
            "STORAGE_ERROR"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(NumberingError::ConcurrencyConflict { attempts: 3 }.is_retryable());
        assert!(!NumberingError::Malformed {
            value: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_display() {
        let err = NumberingError::ConcurrencyConflict { attempts: 3 };
        assert_eq!(
            err.to_string(),
            "Could not allocate a unique document number after 3 attempts"
        );
    }
}
