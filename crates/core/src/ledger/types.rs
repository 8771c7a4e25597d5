//! Ledger domain types for statement computation.
//!
//! The raw record types mirror what the repositories fetch; the entry and
//! statement types are derived on demand and never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;

/// The kind of financial event behind a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A sale bill: increases the amount the customer owes.
    Sale,
    /// A payment received: decreases the amount owed.
    Payment,
    /// A sales return: decreases the amount owed.
    Return,
}

impl EntryKind {
    /// Returns true if this kind posts to the debit column.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Sale)
    }
}

/// A sale row as fetched from the store.
#[derive(Debug, Clone)]
pub struct SaleRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Insertion-order key, strictly increasing per insert.
    pub seq: i64,
    /// The bill number (`FS-YYYY-NNNN`).
    pub bill_no: String,
    /// Business date of the sale.
    pub sale_date: NaiveDate,
    /// Net amount billed to the customer.
    pub net_amount: Decimal,
    /// Optional reference to the payment that settled the bill.
    pub payment_ref: Option<String>,
}

/// A payment row as fetched from the store.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Insertion-order key, strictly increasing per insert.
    pub seq: i64,
    /// Business date of the payment.
    pub payment_date: NaiveDate,
    /// Amount received.
    pub amount: Decimal,
    /// Optional external reference (receipt, transfer id).
    pub payment_ref: Option<String>,
}

/// A sales-return row as fetched from the store.
#[derive(Debug, Clone)]
pub struct ReturnRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Insertion-order key, strictly increasing per insert.
    pub seq: i64,
    /// The return number (`SR-YYYY-NNNN`).
    pub return_no: String,
    /// Business date of the return.
    pub return_date: NaiveDate,
    /// Total value credited back to the customer.
    pub grand_total: Decimal,
}

/// Everything the statement computation needs, fetched at one snapshot.
#[derive(Debug, Clone, Default)]
pub struct LedgerSources {
    /// The customer's stored opening balance.
    pub opening_balance: Decimal,
    /// All sales for the customer, any order.
    pub sales: Vec<SaleRecord>,
    /// All payments for the customer, any order.
    pub payments: Vec<PaymentRecord>,
    /// All sales returns for the customer, any order.
    pub returns: Vec<ReturnRecord>,
}

/// One financial event on a customer's statement.
///
/// Entries are ephemeral: rebuilt from the source rows on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Identifier of the underlying row.
    pub id: Uuid,
    /// Insertion-order key of the underlying row.
    pub seq: i64,
    /// Business date of the event.
    pub date: NaiveDate,
    /// What kind of event this is.
    pub kind: EntryKind,
    /// Human-readable description.
    pub description: String,
    /// Business reference (bill number, payment reference, return number).
    pub reference: Option<String>,
    /// Amount added to what the customer owes.
    pub debit: Decimal,
    /// Amount subtracted from what the customer owes.
    pub credit: Decimal,
}

/// A ledger entry with the balance after applying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    /// The entry itself.
    #[serde(flatten)]
    pub entry: LedgerEntry,
    /// Running balance after this entry.
    pub balance: Decimal,
}

/// A computed customer statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    /// Entries in chronological order with running balances.
    pub lines: Vec<StatementLine>,
    /// Balance carried into the window.
    pub opening_balance: Decimal,
    /// Balance after the last entry in the window.
    pub closing_balance: Decimal,
    /// Sum of all debits in the window.
    pub total_debit: Decimal,
    /// Sum of all credits in the window.
    pub total_credit: Decimal,
}

/// An optional inclusive reporting window.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    /// First day included, if bounded below.
    pub from: Option<NaiveDate>,
    /// Last day included, if bounded above.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Validates that the window is not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRange`] when `from` is after `to`.
    pub fn validate(self) -> Result<(), LedgerError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(LedgerError::InvalidRange { from, to }),
            _ => Ok(()),
        }
    }

    /// Returns true if the date falls before the window.
    #[must_use]
    pub fn is_before(self, date: NaiveDate) -> bool {
        self.from.is_some_and(|from| date < from)
    }

    /// Returns true if the date falls after the window.
    #[must_use]
    pub fn is_after(self, date: NaiveDate) -> bool {
        self.to.is_some_and(|to| date > to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_entry_kind_debit_side() {
        assert!(EntryKind::Sale.is_debit());
        assert!(!EntryKind::Payment.is_debit());
        assert!(!EntryKind::Return.is_debit());
    }

    #[test]
    fn test_date_range_validate() {
        assert!(DateRange::default().validate().is_ok());
        assert!(DateRange {
            from: Some(date(2025, 1, 1)),
            to: Some(date(2025, 1, 1)),
        }
        .validate()
        .is_ok());
        assert!(matches!(
            DateRange {
                from: Some(date(2025, 2, 1)),
                to: Some(date(2025, 1, 1)),
            }
            .validate(),
            Err(LedgerError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_date_range_membership() {
        let range = DateRange {
            from: Some(date(2025, 1, 10)),
            to: Some(date(2025, 1, 20)),
        };
        assert!(range.is_before(date(2025, 1, 9)));
        assert!(!range.is_before(date(2025, 1, 10)));
        assert!(range.is_after(date(2025, 1, 21)));
        assert!(!range.is_after(date(2025, 1, 20)));

        let open = DateRange::default();
        assert!(!open.is_before(date(2025, 1, 1)));
        assert!(!open.is_after(date(2025, 1, 1)));
    }
}
