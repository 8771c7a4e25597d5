//! Order repository with year-scoped order numbering.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use vendra_core::numbering::{
    next_in_year, DocumentKind, NumberingError, MAX_ALLOCATION_ATTEMPTS,
};
use vendra_core::workflow::{OrderStatus, WorkflowError};
use vendra_shared::types::{round_money, PageRequest};

use crate::entities::{customers, orders, sea_orm_active_enums};

use super::{is_unique_violation, year_bounds};

/// Error types for order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Customer is deactivated.
    #[error("Customer {0} is inactive")]
    CustomerInactive(Uuid),

    /// Order amount must be positive.
    #[error("Order amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Document number allocation failed.
    #[error(transparent)]
    Numbering(#[from] NumberingError),

    /// Illegal status transition.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// The ordering customer.
    pub customer_id: Uuid,
    /// Business date of the order.
    pub order_date: NaiveDate,
    /// Total order value.
    pub total_amount: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Filter options for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<OrderStatus>,
}

/// Order repository for CRUD and status transitions.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an order, allocating the next `ORD-YYYY-NNNNN` number.
    ///
    /// The number is derived from the latest order created this year and
    /// inserted under the unique index on `order_no`. Losing the race to
    /// a concurrent writer re-derives and retries, bounded by
    /// [`MAX_ALLOCATION_ATTEMPTS`].
    pub async fn create(&self, input: CreateOrderInput) -> Result<orders::Model, OrderError> {
        let total_amount = round_money(input.total_amount);
        if total_amount <= Decimal::ZERO {
            return Err(OrderError::InvalidAmount(total_amount));
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::CustomerNotFound(input.customer_id))?;
        if !customer.is_active {
            return Err(OrderError::CustomerInactive(customer.id));
        }

        let year = Utc::now().year();

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let last = self.latest_order_no_in_year(year).await?;
            let number = next_in_year(DocumentKind::Order, year, last.as_deref())?;

            let now = Utc::now();
            let model = orders::ActiveModel {
                id: Set(Uuid::now_v7()),
                customer_id: Set(customer.id),
                order_no: Set(number.to_string()),
                order_date: Set(input.order_date),
                status: Set(sea_orm_active_enums::OrderStatus::Pending),
                total_amount: Set(total_amount),
                notes: Set(input.notes.clone()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            match model.insert(&self.db).await {
                Ok(order) => return Ok(order),
                Err(err) if is_unique_violation(&err) => {
                    tracing::debug!(
                        order_no = %number,
                        "order number taken by concurrent writer, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(NumberingError::ConcurrencyConflict {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        }
        .into())
    }

    /// Fetches an order by ID.
    pub async fn get(&self, id: Uuid) -> Result<orders::Model, OrderError> {
        orders::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Lists orders, newest first. Returns the page plus the total
    /// match count.
    pub async fn list(
        &self,
        page: &PageRequest,
        filter: OrderFilter,
    ) -> Result<(Vec<orders::Model>, u64), OrderError> {
        let mut query = orders::Entity::find();

        if let Some(customer_id) = filter.customer_id {
            query = query.filter(orders::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = filter.status {
            let status: sea_orm_active_enums::OrderStatus = status.into();
            query = query.filter(orders::Column::Status.eq(status));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(orders::Column::Seq)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }

    /// Moves an order to a new status, enforcing the transition table.
    pub async fn update_status(
        &self,
        id: Uuid,
        next: OrderStatus,
    ) -> Result<orders::Model, OrderError> {
        let order = self.get(id).await?;
        let current: OrderStatus = order.status.clone().into();
        let next = current.transition(next)?;

        let mut active: orders::ActiveModel = order.into();
        active.status = Set(next.into());
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Number of the most recent order created in `year`, by insertion
    /// order, if any.
    async fn latest_order_no_in_year(&self, year: i32) -> Result<Option<String>, DbErr> {
        let (start, end) = year_bounds(year)?;

        let latest = orders::Entity::find()
            .filter(orders::Column::CreatedAt.gte(start))
            .filter(orders::Column::CreatedAt.lt(end))
            .order_by_desc(orders::Column::Seq)
            .one(&self.db)
            .await?;

        Ok(latest.map(|order| order.order_no))
    }
}
