//! Credit-limit rules and balance reconciliation.
//!
//! The stored `total_due` on a customer is a denormalized cache of the
//! ledger's closing balance. Write paths keep it current; `reconcile`
//! recomputes it from first principles when drift is suspected.

pub mod credit;
pub mod reconcile;

pub use credit::CreditStanding;
pub use reconcile::reconciled_total_due;
