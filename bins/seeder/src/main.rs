//! Database seeder for Vendra development and testing.
//!
//! Seeds a handful of customers with orders, sales, payments, and
//! returns, going through the repositories so the document numbering
//! and the total_due cache behave exactly as they do in production.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

use vendra_db::entities::sea_orm_active_enums::PaymentMethod;
use vendra_db::repositories::{
    CreateCustomerInput, CreateExpenseInput, CreateOrderInput, CreatePaymentInput,
    CreateSaleInput, CreateSalesReturnInput, CustomerRepository, ExpenseRepository,
    OrderRepository, PaymentRepository, SaleRepository, SalesReturnRepository,
};
use vendra_shared::types::PageRequest;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = vendra_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    if already_seeded(&db).await {
        println!("Seed customers already present, skipping...");
        return;
    }

    println!("Seeding customers...");
    let harbor = seed_customer(&db, "Harbor Trading Co.", dec!(100.00), dec!(5000.00)).await;
    let meridian = seed_customer(&db, "Meridian Retail", dec!(0.00), dec!(2000.00)).await;
    let open_account = seed_customer(&db, "Open Account Stores", dec!(250.00), dec!(0.00)).await;

    println!("Seeding orders and sales...");
    seed_trading_history(&db, harbor).await;
    seed_small_history(&db, meridian).await;
    let _ = open_account; // opening balance only, no activity yet

    println!("Seeding expenses...");
    seed_expenses(&db).await;

    println!("Seeding complete!");
}

async fn already_seeded(db: &DatabaseConnection) -> bool {
    let repo = CustomerRepository::new(db.clone());
    match repo
        .list(&PageRequest::default(), Some("Harbor Trading"))
        .await
    {
        Ok((_, total)) => total > 0,
        Err(e) => {
            eprintln!("Failed to check existing seeds: {e}");
            false
        }
    }
}

async fn seed_customer(
    db: &DatabaseConnection,
    name: &str,
    opening_balance: Decimal,
    credit_limit: Decimal,
) -> uuid::Uuid {
    let repo = CustomerRepository::new(db.clone());
    let customer = repo
        .create(CreateCustomerInput {
            name: name.to_string(),
            email: Some(format!(
                "{}@example.com",
                name.to_lowercase().replace([' ', '.'], "")
            )),
            phone: None,
            address: None,
            opening_balance,
            credit_limit,
        })
        .await
        .expect("Failed to seed customer");

    println!("  Created customer: {name}");
    customer.id
}

/// A full trading cycle: order, bill, partial payment, partial return.
async fn seed_trading_history(db: &DatabaseConnection, customer_id: uuid::Uuid) {
    let year = Utc::now().year();
    let date = |m: u32, d: u32| NaiveDate::from_ymd_opt(year, m, d).expect("valid seed date");

    let order = OrderRepository::new(db.clone())
        .create(CreateOrderInput {
            customer_id,
            order_date: date(1, 3),
            total_amount: dec!(500.00),
            notes: Some("January stock replenishment".to_string()),
        })
        .await
        .expect("Failed to seed order");
    println!("  Created order {}", order.order_no);

    let sale = SaleRepository::new(db.clone())
        .create(CreateSaleInput {
            customer_id,
            order_id: Some(order.id),
            sale_date: date(1, 5),
            net_amount: dec!(500.00),
            payment_ref: None,
            notes: None,
        })
        .await
        .expect("Failed to seed sale");
    println!("  Created sale {}", sale.bill_no);

    let payment = PaymentRepository::new(db.clone())
        .create(CreatePaymentInput {
            customer_id,
            sale_id: Some(sale.id),
            payment_date: date(1, 10),
            amount: dec!(200.00),
            method: PaymentMethod::BankTransfer,
            payment_ref: Some("TT-1024".to_string()),
        })
        .await
        .expect("Failed to seed payment");
    PaymentRepository::new(db.clone())
        .verify(payment.id)
        .await
        .expect("Failed to verify seeded payment");

    let sales_return = SalesReturnRepository::new(db.clone())
        .create(CreateSalesReturnInput {
            customer_id,
            sale_id: Some(sale.id),
            return_date: date(1, 15),
            grand_total: dec!(50.00),
            reason: Some("Damaged in transit".to_string()),
        })
        .await
        .expect("Failed to seed return");
    println!("  Created return {}", sales_return.return_no);
}

/// A single unpaid bill.
async fn seed_small_history(db: &DatabaseConnection, customer_id: uuid::Uuid) {
    let year = Utc::now().year();
    let date = |m: u32, d: u32| NaiveDate::from_ymd_opt(year, m, d).expect("valid seed date");

    let sale = SaleRepository::new(db.clone())
        .create(CreateSaleInput {
            customer_id,
            order_id: None,
            sale_date: date(2, 1),
            net_amount: dec!(320.00),
            payment_ref: None,
            notes: None,
        })
        .await
        .expect("Failed to seed sale");
    println!("  Created sale {}", sale.bill_no);
}

async fn seed_expenses(db: &DatabaseConnection) {
    let year = Utc::now().year();
    let date = |m: u32, d: u32| NaiveDate::from_ymd_opt(year, m, d).expect("valid seed date");
    let repo = ExpenseRepository::new(db.clone());

    for (category, month, day, amount) in [
        ("rent", 1, 1, dec!(1200.00)),
        ("utilities", 1, 8, dec!(180.50)),
        ("wages", 1, 31, dec!(2400.00)),
    ] {
        repo.create(CreateExpenseInput {
            category: category.to_string(),
            expense_date: date(month, day),
            amount,
            description: None,
        })
        .await
        .expect("Failed to seed expense");
    }
    println!("  Created 3 expenses");
}
