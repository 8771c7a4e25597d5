//! Customer ledger and statement computation.
//!
//! This module reconstructs a customer's financial history from three raw
//! collections (sales, payments, sales returns):
//! - Ledger entries tagged as debits or credits
//! - Deterministic chronological ordering
//! - Running balances folded over the opening balance
//! - Aggregate totals with an exact closing-balance identity
//!
//! Statements are recomputed on every request and never persisted; the
//! computation has no side effects.

pub mod error;
pub mod statement;
pub mod types;

#[cfg(test)]
mod statement_props;

pub use error::LedgerError;
pub use statement::compute_statement;
pub use types::{
    DateRange, EntryKind, LedgerEntry, LedgerSources, PaymentRecord, ReturnRecord, SaleRecord,
    Statement, StatementLine,
};
