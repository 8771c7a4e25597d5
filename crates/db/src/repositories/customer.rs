//! Customer repository for customer records and the total_due cache.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use vendra_core::customer::{reconciled_total_due, CreditStanding};
use vendra_shared::types::{round_money, PageRequest};

use crate::entities::customers;

use super::statement::fetch_ledger_sources;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Balance carried in from before the customer was onboarded.
    pub opening_balance: Decimal,
    /// Credit limit; zero disables enforcement.
    pub credit_limit: Decimal,
}

/// Input for updating a customer. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerInput {
    /// New display name.
    pub name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New contact phone.
    pub phone: Option<String>,
    /// New postal address.
    pub address: Option<String>,
    /// New credit limit.
    pub credit_limit: Option<Decimal>,
}

/// Customer repository for CRUD and cache maintenance.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer.
    ///
    /// The total_due cache starts at the opening balance: an empty
    /// ledger folded over the opening balance is the opening balance.
    pub async fn create(&self, input: CreateCustomerInput) -> Result<customers::Model, CustomerError> {
        let now = Utc::now();
        let opening_balance = round_money(input.opening_balance);

        let model = customers::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            opening_balance: Set(opening_balance),
            credit_limit: Set(round_money(input.credit_limit)),
            total_due: Set(opening_balance),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(model.insert(&self.db).await?)
    }

    /// Fetches a customer by ID.
    pub async fn get(&self, id: Uuid) -> Result<customers::Model, CustomerError> {
        customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    /// Lists active customers, newest first, optionally filtered by a
    /// name fragment. Returns the page plus the total match count.
    pub async fn list(
        &self,
        page: &PageRequest,
        search: Option<&str>,
    ) -> Result<(Vec<customers::Model>, u64), CustomerError> {
        let mut query = customers::Entity::find().filter(customers::Column::IsActive.eq(true));

        if let Some(fragment) = search {
            query = query.filter(customers::Column::Name.contains(fragment));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(customers::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }

    /// Updates a customer's contact details and credit limit.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let customer = self.get(id).await?;
        let mut active: customers::ActiveModel = customer.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(credit_limit) = input.credit_limit {
            active.credit_limit = Set(round_money(credit_limit));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Soft-deletes a customer. The ledger history stays intact.
    pub async fn deactivate(&self, id: Uuid) -> Result<customers::Model, CustomerError> {
        let customer = self.get(id).await?;
        let mut active: customers::ActiveModel = customer.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Returns the customer's credit position from the stored fields.
    pub async fn credit_standing(&self, id: Uuid) -> Result<CreditStanding, CustomerError> {
        let customer = self.get(id).await?;
        Ok(CreditStanding::new(customer.credit_limit, customer.total_due))
    }

    /// Recomputes total_due from the full ledger and overwrites the cache.
    ///
    /// Write paths maintain the cache synchronously; this repairs drift
    /// from imports or manual corrections.
    pub async fn reconcile(&self, id: Uuid) -> Result<customers::Model, CustomerError> {
        let txn = self.db.begin().await?;

        let customer = customers::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CustomerError::NotFound(id))?;

        let sources = fetch_ledger_sources(&txn, &customer).await?;
        let total_due = reconciled_total_due(&sources);

        if total_due != customer.total_due {
            tracing::info!(
                customer_id = %id,
                cached = %customer.total_due,
                recomputed = %total_due,
                "total_due cache drifted; overwriting"
            );
        }

        let mut active: customers::ActiveModel = customer.into();
        active.total_due = Set(total_due);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }
}
