//! Ledger error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while computing a statement.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The requested window starts after it ends.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange {
        /// Start of the requested window.
        from: NaiveDate,
        /// End of the requested window.
        to: NaiveDate,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRange { .. } => "INVALID_RANGE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::InvalidRange {
            from: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: 2025-02-01 is after 2025-01-01"
        );
        assert_eq!(err.error_code(), "INVALID_RANGE");
    }
}
