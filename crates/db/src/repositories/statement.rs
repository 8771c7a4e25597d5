//! Statement repository: fetches ledger sources and computes statements.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use vendra_core::ledger::{
    compute_statement, DateRange, LedgerError, LedgerSources, PaymentRecord, ReturnRecord,
    SaleRecord, Statement,
};

use crate::entities::{customers, payments, sales, sales_returns, sea_orm_active_enums};

/// Error types for statement operations.
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// The requested window is invalid.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Fetches everything the statement fold needs, in one consistent read.
///
/// All history is fetched regardless of any requested window: the fold
/// needs pre-window entries to derive the window's opening balance.
/// Failed and refunded payments never reached (or left) the ledger, so
/// they are excluded at the source.
pub(crate) async fn fetch_ledger_sources<C: ConnectionTrait>(
    db: &C,
    customer: &customers::Model,
) -> Result<LedgerSources, DbErr> {
    let sales = sales::Entity::find()
        .filter(sales::Column::CustomerId.eq(customer.id))
        .order_by_asc(sales::Column::Seq)
        .all(db)
        .await?
        .into_iter()
        .map(|row| SaleRecord {
            id: row.id,
            seq: row.seq,
            bill_no: row.bill_no,
            sale_date: row.sale_date,
            net_amount: row.net_amount,
            payment_ref: row.payment_ref,
        })
        .collect();

    let payments = payments::Entity::find()
        .filter(payments::Column::CustomerId.eq(customer.id))
        .filter(payments::Column::Status.is_in([
            sea_orm_active_enums::PaymentStatus::Pending,
            sea_orm_active_enums::PaymentStatus::Verified,
        ]))
        .order_by_asc(payments::Column::Seq)
        .all(db)
        .await?
        .into_iter()
        .map(|row| PaymentRecord {
            id: row.id,
            seq: row.seq,
            payment_date: row.payment_date,
            amount: row.amount,
            payment_ref: row.payment_ref,
        })
        .collect();

    let returns = sales_returns::Entity::find()
        .filter(sales_returns::Column::CustomerId.eq(customer.id))
        .order_by_asc(sales_returns::Column::Seq)
        .all(db)
        .await?
        .into_iter()
        .map(|row| ReturnRecord {
            id: row.id,
            seq: row.seq,
            return_no: row.return_no,
            return_date: row.return_date,
            grand_total: row.grand_total,
        })
        .collect();

    Ok(LedgerSources {
        opening_balance: customer.opening_balance,
        sales,
        payments,
        returns,
    })
}

/// Statement repository: a read-only computation over the ledger tables.
#[derive(Debug, Clone)]
pub struct StatementRepository {
    db: DatabaseConnection,
}

impl StatementRepository {
    /// Creates a new statement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes a customer's statement over an optional window.
    ///
    /// The three source tables are read inside one transaction so the
    /// fold never mixes pre- and post-update states. Mutates nothing;
    /// the stored total_due cache is not consulted.
    pub async fn customer_statement(
        &self,
        customer_id: Uuid,
        range: DateRange,
    ) -> Result<Statement, StatementError> {
        let txn = self.db.begin().await?;

        let customer = customers::Entity::find_by_id(customer_id)
            .one(&txn)
            .await?
            .ok_or(StatementError::CustomerNotFound(customer_id))?;

        let sources = fetch_ledger_sources(&txn, &customer).await?;
        txn.commit().await?;

        Ok(compute_statement(&sources, range)?)
    }
}
