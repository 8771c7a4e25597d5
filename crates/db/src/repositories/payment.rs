//! Payment repository with settlement workflow and cache maintenance.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use vendra_core::workflow::{PaymentStatus, WorkflowError};
use vendra_shared::types::{round_money, PageRequest};

use crate::entities::{customers, payments, sales, sea_orm_active_enums};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Customer is deactivated.
    #[error("Customer {0} is inactive")]
    CustomerInactive(Uuid),

    /// The linked sale does not exist or belongs to another customer.
    #[error("Sale {0} does not belong to the customer")]
    SaleMismatch(Uuid),

    /// Payment amount must be positive.
    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Illegal status transition.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// The paying customer.
    pub customer_id: Uuid,
    /// Optional sale this payment settles.
    pub sale_id: Option<Uuid>,
    /// Business date of the payment.
    pub payment_date: NaiveDate,
    /// Amount received.
    pub amount: Decimal,
    /// How the payment was made.
    pub method: sea_orm_active_enums::PaymentMethod,
    /// Optional external reference (receipt, transfer id).
    pub payment_ref: Option<String>,
}

/// Payment repository for recording and settling payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment in `pending` status.
    ///
    /// The insert and the total_due decrement commit in one transaction:
    /// a recorded payment is credited to the ledger immediately and
    /// backed out again if it later fails.
    pub async fn create(&self, input: CreatePaymentInput) -> Result<payments::Model, PaymentError> {
        let amount = round_money(input.amount);
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(amount));
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::CustomerNotFound(input.customer_id))?;
        if !customer.is_active {
            return Err(PaymentError::CustomerInactive(customer.id));
        }

        if let Some(sale_id) = input.sale_id {
            let sale = sales::Entity::find_by_id(sale_id)
                .one(&self.db)
                .await?
                .ok_or(PaymentError::SaleMismatch(sale_id))?;
            if sale.customer_id != customer.id {
                return Err(PaymentError::SaleMismatch(sale_id));
            }
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let payment = payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_id: Set(customer.id),
            sale_id: Set(input.sale_id),
            payment_date: Set(input.payment_date),
            amount: Set(amount),
            method: Set(input.method),
            payment_ref: Set(input.payment_ref),
            status: Set(sea_orm_active_enums::PaymentStatus::Pending),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        Self::adjust_total_due(&txn, customer.id, -amount).await?;
        txn.commit().await?;

        Ok(payment)
    }

    /// Fetches a payment by ID.
    pub async fn get(&self, id: Uuid) -> Result<payments::Model, PaymentError> {
        payments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(id))
    }

    /// Lists payments, newest first, optionally for one customer.
    /// Returns the page plus the total match count.
    pub async fn list(
        &self,
        page: &PageRequest,
        customer_id: Option<Uuid>,
    ) -> Result<(Vec<payments::Model>, u64), PaymentError> {
        let mut query = payments::Entity::find();

        if let Some(customer_id) = customer_id {
            query = query.filter(payments::Column::CustomerId.eq(customer_id));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(payments::Column::Seq)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }

    /// Confirms a pending payment against the bank.
    ///
    /// No balance change: the credit was taken at recording time.
    pub async fn verify(&self, id: Uuid) -> Result<payments::Model, PaymentError> {
        let payment = self.get(id).await?;
        let next = Self::transition(&payment, PaymentStatus::Verified)?;

        let mut active: payments::ActiveModel = payment.into();
        active.status = Set(next.into());
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Marks a pending payment as failed (bounced, rejected).
    ///
    /// The credit taken at recording time is backed out of total_due.
    pub async fn fail(&self, id: Uuid) -> Result<payments::Model, PaymentError> {
        self.settle_with_reversal(id, PaymentStatus::Failed).await
    }

    /// Refunds a verified payment to the customer.
    ///
    /// The customer owes the refunded amount again.
    pub async fn refund(&self, id: Uuid) -> Result<payments::Model, PaymentError> {
        self.settle_with_reversal(id, PaymentStatus::Refunded).await
    }

    /// Transitions a payment into a state whose credit must be backed
    /// out, reversing total_due in the same transaction.
    async fn settle_with_reversal(
        &self,
        id: Uuid,
        target: PaymentStatus,
    ) -> Result<payments::Model, PaymentError> {
        let payment = self.get(id).await?;
        let next = Self::transition(&payment, target)?;
        let amount = payment.amount;
        let customer_id = payment.customer_id;

        let txn = self.db.begin().await?;

        let mut active: payments::ActiveModel = payment.into();
        active.status = Set(next.into());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        Self::adjust_total_due(&txn, customer_id, amount).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Validates a status move through the core transition table.
    fn transition(
        payment: &payments::Model,
        target: PaymentStatus,
    ) -> Result<PaymentStatus, PaymentError> {
        let current: PaymentStatus = payment.status.clone().into();
        Ok(current.transition(target)?)
    }

    /// Applies a signed delta to the customer's total_due cache.
    async fn adjust_total_due(
        txn: &DatabaseTransaction,
        customer_id: Uuid,
        delta: Decimal,
    ) -> Result<(), DbErr> {
        customers::Entity::update_many()
            .col_expr(
                customers::Column::TotalDue,
                Expr::col(customers::Column::TotalDue).add(delta),
            )
            .col_expr(customers::Column::UpdatedAt, Expr::value(Utc::now()).into())
            .filter(customers::Column::Id.eq(customer_id))
            .exec(txn)
            .await?;
        Ok(())
    }
}
