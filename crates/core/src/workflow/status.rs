//! Status enumerations with explicit transition tables.

use serde::{Deserialize, Serialize};

use super::error::WorkflowError;

/// Order fulfilment status.
///
/// The happy path is Pending → Verified → Processing → Completed.
/// Cancelled and Failed absorb from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order received, awaiting verification.
    Pending,
    /// Order details confirmed.
    Verified,
    /// Order is being fulfilled.
    Processing,
    /// Order delivered and closed.
    Completed,
    /// Order cancelled before completion.
    Cancelled,
    /// Order could not be fulfilled.
    Failed,
}

impl OrderStatus {
    /// Returns true if no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Returns true if the order may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Verified)
                | (Self::Verified, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (
                    Self::Pending | Self::Verified | Self::Processing,
                    Self::Cancelled | Self::Failed
                )
        )
    }

    /// Moves to `next`, rejecting illegal transitions.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidOrderTransition`] when the move
    /// is not in the transition table.
    pub fn transition(self, next: Self) -> Result<Self, WorkflowError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(WorkflowError::InvalidOrderTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown order status: {s}")),
        }
    }
}

/// Payment settlement status.
///
/// Pending → Verified or Failed; Verified → Refunded. Failed and
/// Refunded absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment recorded, not yet confirmed against the bank.
    Pending,
    /// Payment confirmed.
    Verified,
    /// Payment bounced or was rejected.
    Failed,
    /// Payment returned to the customer.
    Refunded,
}

impl PaymentStatus {
    /// Returns true if no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Refunded)
    }

    /// Returns true if the payment may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Verified | Self::Failed) | (Self::Verified, Self::Refunded)
        )
    }

    /// Moves to `next`, rejecting illegal transitions.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidPaymentTransition`] when the move
    /// is not in the transition table.
    pub fn transition(self, next: Self) -> Result<Self, WorkflowError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(WorkflowError::InvalidPaymentTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("Unknown payment status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OrderStatus::Pending, OrderStatus::Verified, true)]
    #[case(OrderStatus::Verified, OrderStatus::Processing, true)]
    #[case(OrderStatus::Processing, OrderStatus::Completed, true)]
    #[case(OrderStatus::Pending, OrderStatus::Cancelled, true)]
    #[case(OrderStatus::Processing, OrderStatus::Failed, true)]
    #[case(OrderStatus::Pending, OrderStatus::Processing, false)] // skips verification
    #[case(OrderStatus::Completed, OrderStatus::Cancelled, false)] // terminal
    #[case(OrderStatus::Cancelled, OrderStatus::Pending, false)] // absorbing
    #[case(OrderStatus::Verified, OrderStatus::Verified, false)] // self-loop
    fn test_order_transitions(
        #[case] from: OrderStatus,
        #[case] to: OrderStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
        assert_eq!(from.transition(to).is_ok(), allowed);
    }

    #[rstest]
    #[case(PaymentStatus::Pending, PaymentStatus::Verified, true)]
    #[case(PaymentStatus::Pending, PaymentStatus::Failed, true)]
    #[case(PaymentStatus::Verified, PaymentStatus::Refunded, true)]
    #[case(PaymentStatus::Pending, PaymentStatus::Refunded, false)] // must verify first
    #[case(PaymentStatus::Failed, PaymentStatus::Verified, false)] // absorbing
    #[case(PaymentStatus::Refunded, PaymentStatus::Pending, false)] // absorbing
    fn test_payment_transitions(
        #[case] from: PaymentStatus,
        #[case] to: PaymentStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
        assert_eq!(from.transition(to).is_ok(), allowed);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());

        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
        assert!(!PaymentStatus::Verified.is_terminal());
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Verified,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Verified,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(
                status.to_string().parse::<PaymentStatus>().unwrap(),
                status
            );
        }
    }
}
