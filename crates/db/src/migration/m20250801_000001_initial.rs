//! Initial schema: customers, orders, sales, payments, sales_returns.
//!
//! Document number columns carry unique indexes; the numbering retry
//! loop depends on them. Each ledger source table carries a `BIGSERIAL`
//! insertion-order column used for statement tie-breaking and for the
//! "latest number this year" lookup.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS sales_returns CASCADE;
             DROP TABLE IF EXISTS payments CASCADE;
             DROP TABLE IF EXISTS sales CASCADE;
             DROP TABLE IF EXISTS orders CASCADE;
             DROP TABLE IF EXISTS customers CASCADE;
             DROP TYPE IF EXISTS payment_method;
             DROP TYPE IF EXISTS payment_status;
             DROP TYPE IF EXISTS order_status;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Status enums (closed sets, not free-form strings)
CREATE TYPE order_status AS ENUM ('pending', 'verified', 'processing', 'completed', 'cancelled', 'failed');
CREATE TYPE payment_status AS ENUM ('pending', 'verified', 'failed', 'refunded');
CREATE TYPE payment_method AS ENUM ('cash', 'card', 'bank_transfer', 'cheque');

-- Customers with the denormalized total_due cache
CREATE TABLE customers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(32),
    address TEXT,
    opening_balance NUMERIC(14, 2) NOT NULL DEFAULT 0,
    credit_limit NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_due NUMERIC(14, 2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_customers_name ON customers(name) WHERE is_active;

-- Orders
CREATE TABLE orders (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
    order_no VARCHAR(32) NOT NULL,
    order_date DATE NOT NULL,
    status order_status NOT NULL DEFAULT 'pending',
    total_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    notes TEXT,
    seq BIGSERIAL NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- The numbering retry loop relies on this constraint
CREATE UNIQUE INDEX idx_orders_order_no ON orders(order_no);
CREATE INDEX idx_orders_customer ON orders(customer_id, order_date DESC);
CREATE INDEX idx_orders_created_seq ON orders(created_at, seq DESC);

-- Sales (bills)
CREATE TABLE sales (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
    order_id UUID REFERENCES orders(id) ON DELETE SET NULL,
    bill_no VARCHAR(32) NOT NULL,
    sale_date DATE NOT NULL,
    net_amount NUMERIC(14, 2) NOT NULL,
    payment_ref VARCHAR(64),
    notes TEXT,
    seq BIGSERIAL NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_sales_bill_no ON sales(bill_no);
CREATE INDEX idx_sales_customer ON sales(customer_id, sale_date);
CREATE INDEX idx_sales_created_seq ON sales(created_at, seq DESC);

-- Payments
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
    sale_id UUID REFERENCES sales(id) ON DELETE SET NULL,
    payment_date DATE NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    method payment_method NOT NULL,
    payment_ref VARCHAR(64),
    status payment_status NOT NULL DEFAULT 'pending',
    seq BIGSERIAL NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_payments_customer ON payments(customer_id, payment_date);

-- Sales returns
CREATE TABLE sales_returns (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
    sale_id UUID REFERENCES sales(id) ON DELETE SET NULL,
    return_no VARCHAR(32) NOT NULL,
    return_date DATE NOT NULL,
    grand_total NUMERIC(14, 2) NOT NULL,
    reason TEXT,
    seq BIGSERIAL NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_sales_returns_return_no ON sales_returns(return_no);
CREATE INDEX idx_sales_returns_customer ON sales_returns(customer_id, return_date);
CREATE INDEX idx_sales_returns_created_seq ON sales_returns(created_at, seq DESC);
";
