//! Sale repository with year-scoped bill numbering and credit checks.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use vendra_core::customer::CreditStanding;
use vendra_core::numbering::{
    next_in_year, DocumentKind, NumberingError, MAX_ALLOCATION_ATTEMPTS,
};
use vendra_shared::types::{round_money, PageRequest};

use crate::entities::{customers, orders, sales};

use super::{is_unique_violation, year_bounds};

/// Error types for sale operations.
#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    /// Sale not found.
    #[error("Sale not found: {0}")]
    NotFound(Uuid),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Customer is deactivated.
    #[error("Customer {0} is inactive")]
    CustomerInactive(Uuid),

    /// The linked order does not exist or belongs to another customer.
    #[error("Order {0} does not belong to the customer")]
    OrderMismatch(Uuid),

    /// Sale amount must be positive.
    #[error("Sale amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Billing this sale would push the customer past their limit.
    #[error("Credit limit exceeded: {available} available, {requested} requested")]
    CreditLimitExceeded {
        /// How much credit remains.
        available: Decimal,
        /// The rejected bill amount.
        requested: Decimal,
    },

    /// Document number allocation failed.
    #[error(transparent)]
    Numbering(#[from] NumberingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a sale.
#[derive(Debug, Clone)]
pub struct CreateSaleInput {
    /// The billed customer.
    pub customer_id: Uuid,
    /// Optional originating order.
    pub order_id: Option<Uuid>,
    /// Business date of the sale.
    pub sale_date: NaiveDate,
    /// Net amount billed.
    pub net_amount: Decimal,
    /// Optional reference to the settling payment.
    pub payment_ref: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Sale repository for bill creation and lookup.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    db: DatabaseConnection,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a sale, allocating the next `FS-YYYY-NNNN` bill number.
    ///
    /// The credit limit is checked against the cached total_due before
    /// billing. The insert and the total_due increment commit in one
    /// transaction, so the cache tracks the ledger. Number allocation
    /// retries on a lost race, bounded by [`MAX_ALLOCATION_ATTEMPTS`].
    pub async fn create(&self, input: CreateSaleInput) -> Result<sales::Model, SaleError> {
        let net_amount = round_money(input.net_amount);
        if net_amount <= Decimal::ZERO {
            return Err(SaleError::InvalidAmount(net_amount));
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?
            .ok_or(SaleError::CustomerNotFound(input.customer_id))?;
        if !customer.is_active {
            return Err(SaleError::CustomerInactive(customer.id));
        }

        let standing = CreditStanding::new(customer.credit_limit, customer.total_due);
        if standing.would_exceed(net_amount) {
            return Err(SaleError::CreditLimitExceeded {
                available: standing.available_credit(),
                requested: net_amount,
            });
        }

        if let Some(order_id) = input.order_id {
            let order = orders::Entity::find_by_id(order_id)
                .one(&self.db)
                .await?
                .ok_or(SaleError::OrderMismatch(order_id))?;
            if order.customer_id != customer.id {
                return Err(SaleError::OrderMismatch(order_id));
            }
        }

        let year = Utc::now().year();

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let last = self.latest_bill_no_in_year(year).await?;
            let number = next_in_year(DocumentKind::SaleBill, year, last.as_deref())?;

            let txn = self.db.begin().await?;
            let now = Utc::now();
            let model = sales::ActiveModel {
                id: Set(Uuid::now_v7()),
                customer_id: Set(customer.id),
                order_id: Set(input.order_id),
                bill_no: Set(number.to_string()),
                sale_date: Set(input.sale_date),
                net_amount: Set(net_amount),
                payment_ref: Set(input.payment_ref.clone()),
                notes: Set(input.notes.clone()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            let sale = match model.insert(&txn).await {
                Ok(sale) => sale,
                Err(err) if is_unique_violation(&err) => {
                    txn.rollback().await?;
                    tracing::debug!(
                        bill_no = %number,
                        "bill number taken by concurrent writer, retrying"
                    );
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            // Synchronous cache maintenance: a sale is a debit.
            customers::Entity::update_many()
                .col_expr(
                    customers::Column::TotalDue,
                    Expr::col(customers::Column::TotalDue).add(net_amount),
                )
                .col_expr(customers::Column::UpdatedAt, Expr::value(now).into())
                .filter(customers::Column::Id.eq(customer.id))
                .exec(&txn)
                .await?;

            txn.commit().await?;
            return Ok(sale);
        }

        Err(NumberingError::ConcurrencyConflict {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        }
        .into())
    }

    /// Fetches a sale by ID.
    pub async fn get(&self, id: Uuid) -> Result<sales::Model, SaleError> {
        sales::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SaleError::NotFound(id))
    }

    /// Lists sales, newest first, optionally for one customer. Returns
    /// the page plus the total match count.
    pub async fn list(
        &self,
        page: &PageRequest,
        customer_id: Option<Uuid>,
    ) -> Result<(Vec<sales::Model>, u64), SaleError> {
        let mut query = sales::Entity::find();

        if let Some(customer_id) = customer_id {
            query = query.filter(sales::Column::CustomerId.eq(customer_id));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(sales::Column::Seq)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }

    /// Number of the most recent sale created in `year`, by insertion
    /// order, if any.
    async fn latest_bill_no_in_year(&self, year: i32) -> Result<Option<String>, DbErr> {
        let (start, end) = year_bounds(year)?;

        let latest = sales::Entity::find()
            .filter(sales::Column::CreatedAt.gte(start))
            .filter(sales::Column::CreatedAt.lt(end))
            .order_by_desc(sales::Column::Seq)
            .one(&self.db)
            .await?;

        Ok(latest.map(|sale| sale.bill_no))
    }
}
