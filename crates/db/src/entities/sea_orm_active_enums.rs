//! Database enum types mapped to Postgres enums.
//!
//! These mirror the domain enums in `vendra-core`; the `From`
//! conversions keep the two families in lockstep.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order fulfilment status (Postgres enum `order_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order received, awaiting verification.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Order details confirmed.
    #[sea_orm(string_value = "verified")]
    Verified,
    /// Order is being fulfilled.
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Order delivered and closed.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Order cancelled before completion.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Order could not be fulfilled.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Payment settlement status (Postgres enum `payment_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment recorded, not yet confirmed.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Payment confirmed.
    #[sea_orm(string_value = "verified")]
    Verified,
    /// Payment bounced or was rejected.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Payment returned to the customer.
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// How a payment was made (Postgres enum `payment_method`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash over the counter.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Card terminal.
    #[sea_orm(string_value = "card")]
    Card,
    /// Bank transfer.
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Cheque.
    #[sea_orm(string_value = "cheque")]
    Cheque,
}

impl From<vendra_core::workflow::OrderStatus> for OrderStatus {
    fn from(status: vendra_core::workflow::OrderStatus) -> Self {
        use vendra_core::workflow::OrderStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Verified => Self::Verified,
            Core::Processing => Self::Processing,
            Core::Completed => Self::Completed,
            Core::Cancelled => Self::Cancelled,
            Core::Failed => Self::Failed,
        }
    }
}

impl From<OrderStatus> for vendra_core::workflow::OrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Pending,
            OrderStatus::Verified => Self::Verified,
            OrderStatus::Processing => Self::Processing,
            OrderStatus::Completed => Self::Completed,
            OrderStatus::Cancelled => Self::Cancelled,
            OrderStatus::Failed => Self::Failed,
        }
    }
}

impl From<vendra_core::workflow::PaymentStatus> for PaymentStatus {
    fn from(status: vendra_core::workflow::PaymentStatus) -> Self {
        use vendra_core::workflow::PaymentStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Verified => Self::Verified,
            Core::Failed => Self::Failed,
            Core::Refunded => Self::Refunded,
        }
    }
}

impl From<PaymentStatus> for vendra_core::workflow::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Verified => Self::Verified,
            PaymentStatus::Failed => Self::Failed,
            PaymentStatus::Refunded => Self::Refunded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip_through_core() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Verified,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Failed,
        ] {
            let core: vendra_core::workflow::OrderStatus = status.clone().into();
            let back: OrderStatus = core.into();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_payment_status_round_trip_through_core() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Verified,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            let core: vendra_core::workflow::PaymentStatus = status.clone().into();
            let back: PaymentStatus = core.into();
            assert_eq!(back, status);
        }
    }
}
