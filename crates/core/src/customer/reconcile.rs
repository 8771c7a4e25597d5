//! Recomputation of the cached `total_due` from the full ledger.

use rust_decimal::Decimal;

use vendra_shared::types::round_money;

use crate::ledger::LedgerSources;

/// Recomputes the amount a customer owes from first principles.
///
/// `total_due = opening_balance + Σ sales - Σ payments - Σ returns`,
/// normalized to two fraction digits. Chronology is irrelevant to the
/// total, so no ordering pass is needed.
///
/// The caller overwrites the customer's cached `total_due` with the
/// returned value.
#[must_use]
pub fn reconciled_total_due(sources: &LedgerSources) -> Decimal {
    let sales: Decimal = sources
        .sales
        .iter()
        .map(|s| round_money(s.net_amount))
        .sum();
    let payments: Decimal = sources
        .payments
        .iter()
        .map(|p| round_money(p.amount))
        .sum();
    let returns: Decimal = sources
        .returns
        .iter()
        .map(|r| round_money(r.grand_total))
        .sum();

    round_money(sources.opening_balance) + sales - payments - returns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::statement::compute_statement;
    use crate::ledger::types::{DateRange, PaymentRecord, ReturnRecord, SaleRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sources() -> LedgerSources {
        LedgerSources {
            opening_balance: dec!(100.00),
            sales: vec![SaleRecord {
                id: Uuid::now_v7(),
                seq: 1,
                bill_no: "FS-2025-0001".to_string(),
                sale_date: date(2025, 1, 5),
                net_amount: dec!(500.00),
                payment_ref: None,
            }],
            payments: vec![PaymentRecord {
                id: Uuid::now_v7(),
                seq: 2,
                payment_date: date(2025, 1, 10),
                amount: dec!(200.00),
                payment_ref: None,
            }],
            returns: vec![ReturnRecord {
                id: Uuid::now_v7(),
                seq: 3,
                return_no: "SR-2025-0001".to_string(),
                return_date: date(2025, 1, 15),
                grand_total: dec!(50.00),
            }],
        }
    }

    #[test]
    fn test_reconciled_total() {
        assert_eq!(reconciled_total_due(&sources()), dec!(350.00));
    }

    #[test]
    fn test_reconciled_total_matches_statement_closing_balance() {
        let sources = sources();
        let statement = compute_statement(&sources, DateRange::default()).unwrap();
        assert_eq!(reconciled_total_due(&sources), statement.closing_balance);
    }

    #[test]
    fn test_empty_ledger_reconciles_to_opening_balance() {
        let sources = LedgerSources {
            opening_balance: dec!(42.00),
            ..LedgerSources::default()
        };
        assert_eq!(reconciled_total_due(&sources), dec!(42.00));
    }
}
