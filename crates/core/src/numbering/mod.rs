//! Year-scoped document number generation.
//!
//! This module implements the business reference codes printed on orders,
//! sales bills, and sales returns:
//! - Document kinds with fixed prefixes and pad widths
//! - Parsing and rendering of document numbers
//! - Next-in-sequence derivation from the latest number of the year
//! - A bounded-retry allocation protocol for concurrent creation

pub mod error;
pub mod generator;
pub mod types;

#[cfg(test)]
mod generator_props;

pub use error::NumberingError;
pub use generator::{allocate_number, next_in_year, InsertOutcome, MAX_ALLOCATION_ATTEMPTS};
pub use types::{DocumentKind, DocumentNumber};
