//! Workflow error types.

use thiserror::Error;

use super::status::{OrderStatus, PaymentStatus};

/// Errors raised by illegal status transitions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The order cannot move between these states.
    #[error("Order cannot move from {from} to {to}")]
    InvalidOrderTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// The payment cannot move between these states.
    #[error("Payment cannot move from {from} to {to}")]
    InvalidPaymentTransition {
        /// Current status.
        from: PaymentStatus,
        /// Requested status.
        to: PaymentStatus,
    },
}

impl WorkflowError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidOrderTransition { .. } => "INVALID_ORDER_TRANSITION",
            Self::InvalidPaymentTransition { .. } => "INVALID_PAYMENT_TRANSITION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkflowError::InvalidOrderTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.to_string(), "Order cannot move from completed to pending");
        assert_eq!(err.error_code(), "INVALID_ORDER_TRANSITION");
    }
}
