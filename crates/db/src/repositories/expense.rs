//! Expense repository for operating-cost tracking.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use vendra_shared::types::{round_money, PageRequest};

use crate::entities::expenses;

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(Uuid),

    /// Expense amount must be positive.
    #[error("Expense amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Expense category (rent, utilities, wages, ...).
    pub category: String,
    /// Business date of the expense.
    pub expense_date: NaiveDate,
    /// Amount spent.
    pub amount: Decimal,
    /// Free-form description.
    pub description: Option<String>,
}

/// Filter options for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an expense.
    pub async fn create(&self, input: CreateExpenseInput) -> Result<expenses::Model, ExpenseError> {
        let amount = round_money(input.amount);
        if amount <= Decimal::ZERO {
            return Err(ExpenseError::InvalidAmount(amount));
        }

        let now = Utc::now();
        let model = expenses::ActiveModel {
            id: Set(Uuid::now_v7()),
            category: Set(input.category),
            expense_date: Set(input.expense_date),
            amount: Set(amount),
            description: Set(input.description),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(model.insert(&self.db).await?)
    }

    /// Fetches an expense by ID.
    pub async fn get(&self, id: Uuid) -> Result<expenses::Model, ExpenseError> {
        expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(id))
    }

    /// Lists expenses, newest first. Returns the page plus the total
    /// match count.
    pub async fn list(
        &self,
        page: &PageRequest,
        filter: ExpenseFilter,
    ) -> Result<(Vec<expenses::Model>, u64), ExpenseError> {
        let mut query = expenses::Entity::find();

        if let Some(category) = filter.category {
            query = query.filter(expenses::Column::Category.eq(category));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(expenses::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(expenses::Column::ExpenseDate.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(expenses::Column::ExpenseDate)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }
}
