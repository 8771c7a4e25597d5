//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20250801_000001_initial;
mod m20250801_000002_expenses;

/// The migrator for all Vendra migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_initial::Migration),
            Box::new(m20250801_000002_expenses::Migration),
        ]
    }
}
