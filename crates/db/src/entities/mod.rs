//! `SeaORM` entity definitions.

pub mod customers;
pub mod expenses;
pub mod orders;
pub mod payments;
pub mod sales;
pub mod sales_returns;
pub mod sea_orm_active_enums;
