//! Sales-return repository with year-scoped return numbering.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use vendra_core::numbering::{
    next_in_year, DocumentKind, NumberingError, MAX_ALLOCATION_ATTEMPTS,
};
use vendra_shared::types::{round_money, PageRequest};

use crate::entities::{customers, sales, sales_returns};

use super::{is_unique_violation, year_bounds};

/// Error types for sales-return operations.
#[derive(Debug, thiserror::Error)]
pub enum SalesReturnError {
    /// Return not found.
    #[error("Sales return not found: {0}")]
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

    /// Return amount must be positive.
    #[error("Return amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Document number allocation failed.
    #[error(transparent)]
    Numbering(#[from] NumberingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a sales return.
#[derive(Debug, Clone)]
pub struct CreateSalesReturnInput {
    /// The returning customer.
    pub customer_id: Uuid,
    /// Optional sale the goods came from.
    pub sale_id: Option<Uuid>,
    /// Business date of the return.
    pub return_date: NaiveDate,
    /// Total value credited back.
    pub grand_total: Decimal,
    /// Why the goods came back.
    pub reason: Option<String>,
}

/// Sales-return repository.
#[derive(Debug, Clone)]
pub struct SalesReturnRepository {
    db: DatabaseConnection,
}

impl SalesReturnRepository {
    /// Creates a new sales-return repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a sales return, allocating the next `SR-YYYY-NNNN` number.
    ///
    /// The insert and the total_due decrement commit in one transaction.
    /// Number allocation retries on a lost race, bounded by
    /// [`MAX_ALLOCATION_ATTEMPTS`].
    pub async fn create(
        &self,
        input: CreateSalesReturnInput,
    ) -> Result<sales_returns::Model, SalesReturnError> {
        let grand_total = round_money(input.grand_total);
        if grand_total <= Decimal::ZERO {
            return Err(SalesReturnError::InvalidAmount(grand_total));
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?
            .ok_or(SalesReturnError::CustomerNotFound(input.customer_id))?;
        if !customer.is_active {
            return Err(SalesReturnError::CustomerInactive(customer.id));
        }

        if let Some(sale_id) = input.sale_id {
            let sale = sales::Entity::find_by_id(sale_id)
                .one(&self.db)
                .await?
                .ok_or(SalesReturnError::SaleMismatch(sale_id))?;
            if sale.customer_id != customer.id {
                return Err(SalesReturnError::SaleMismatch(sale_id));
            }
        }

        let year = Utc::now().year();

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let last = self.latest_return_no_in_year(year).await?;
            let number = next_in_year(DocumentKind::SalesReturn, year, last.as_deref())?;

            let txn = self.db.begin().await?;
            let now = Utc::now();
            let model = sales_returns::ActiveModel {
                id: Set(Uuid::now_v7()),
                customer_id: Set(customer.id),
                sale_id: Set(input.sale_id),
                return_no: Set(number.to_string()),
                return_date: Set(input.return_date),
                grand_total: Set(grand_total),
                reason: Set(input.reason.clone()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            let sales_return = match model.insert(&txn).await {
                Ok(row) => row,
                Err(err) if is_unique_violation(&err) => {
                    txn.rollback().await?;
                    tracing::debug!(
                        return_no = %number,
                        "return number taken by concurrent writer, retrying"
                    );
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            // Synchronous cache maintenance: a return is a credit.
            customers::Entity::update_many()
                .col_expr(
                    customers::Column::TotalDue,
                    Expr::col(customers::Column::TotalDue).sub(grand_total),
                )
                .col_expr(customers::Column::UpdatedAt, Expr::value(now).into())
                .filter(customers::Column::Id.eq(customer.id))
                .exec(&txn)
                .await?;

            txn.commit().await?;
            return Ok(sales_return);
        }

        Err(NumberingError::ConcurrencyConflict {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        }
        .into())
    }

    /// Fetches a sales return by ID.
    pub async fn get(&self, id: Uuid) -> Result<sales_returns::Model, SalesReturnError> {
        sales_returns::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SalesReturnError::NotFound(id))
    }

    /// Lists sales returns, newest first, optionally for one customer.
    /// Returns the page plus the total match count.
    pub async fn list(
        &self,
        page: &PageRequest,
        customer_id: Option<Uuid>,
    ) -> Result<(Vec<sales_returns::Model>, u64), SalesReturnError> {
        let mut query = sales_returns::Entity::find();

        if let Some(customer_id) = customer_id {
            query = query.filter(sales_returns::Column::CustomerId.eq(customer_id));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(sales_returns::Column::Seq)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }

    /// Number of the most recent return created in `year`, by insertion
    /// order, if any.
    async fn latest_return_no_in_year(&self, year: i32) -> Result<Option<String>, DbErr> {
        let (start, end) = year_bounds(year)?;

        let latest = sales_returns::Entity::find()
            .filter(sales_returns::Column::CreatedAt.gte(start))
            .filter(sales_returns::Column::CreatedAt.lt(end))
            .order_by_desc(sales_returns::Column::Seq)
            .one(&self.db)
            .await?;

        Ok(latest.map(|row| row.return_no))
    }
}
