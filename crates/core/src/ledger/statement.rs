//! Statement computation: entry union, ordering, and the balance fold.

use rust_decimal::Decimal;

use vendra_shared::types::round_money;

use super::error::LedgerError;
use super::types::{
    DateRange, EntryKind, LedgerEntry, LedgerSources, Statement, StatementLine,
};

/// Computes a customer statement over an optional inclusive window.
///
/// All three source collections are unioned into one entry list, sorted
/// ascending by business date with ties broken by insertion order, and
/// folded into running balances starting from the opening balance.
///
/// For a bounded window, entries strictly before `from` are folded into
/// the opening balance and entries after `to` are dropped; only in-window
/// entries appear as lines. The returned totals satisfy
/// `closing_balance == opening_balance + total_debit - total_credit`
/// exactly.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidRange`] when `from` is after `to`.
pub fn compute_statement(
    sources: &LedgerSources,
    range: DateRange,
) -> Result<Statement, LedgerError> {
    range.validate()?;

    let mut entries = collect_entries(sources);
    entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.seq.cmp(&b.seq)));

    let mut opening_balance = round_money(sources.opening_balance);
    let mut lines = Vec::with_capacity(entries.len());
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    let mut balance = opening_balance;

    for entry in entries {
        if range.is_before(entry.date) {
            // Carried into the window's opening balance.
            opening_balance += entry.debit - entry.credit;
            balance = opening_balance;
            continue;
        }
        if range.is_after(entry.date) {
            continue;
        }

        total_debit += entry.debit;
        total_credit += entry.credit;
        balance += entry.debit - entry.credit;
        lines.push(StatementLine { entry, balance });
    }

    Ok(Statement {
        lines,
        opening_balance,
        closing_balance: balance,
        total_debit,
        total_credit,
    })
}

/// Unions the three source collections into untagged ledger entries.
fn collect_entries(sources: &LedgerSources) -> Vec<LedgerEntry> {
    let mut entries =
        Vec::with_capacity(sources.sales.len() + sources.payments.len() + sources.returns.len());

    for sale in &sources.sales {
        entries.push(LedgerEntry {
            id: sale.id,
            seq: sale.seq,
            date: sale.sale_date,
            kind: EntryKind::Sale,
            description: format!("Sale {}", sale.bill_no),
            reference: Some(sale.bill_no.clone()),
            debit: round_money(sale.net_amount),
            credit: Decimal::ZERO,
        });
    }

    for payment in &sources.payments {
        entries.push(LedgerEntry {
            id: payment.id,
            seq: payment.seq,
            date: payment.payment_date,
            kind: EntryKind::Payment,
            description: "Payment received".to_string(),
            reference: payment.payment_ref.clone(),
            debit: Decimal::ZERO,
            credit: round_money(payment.amount),
        });
    }

    for ret in &sources.returns {
        entries.push(LedgerEntry {
            id: ret.id,
            seq: ret.seq,
            date: ret.return_date,
            kind: EntryKind::Return,
            description: format!("Sales return {}", ret.return_no),
            reference: Some(ret.return_no.clone()),
            debit: Decimal::ZERO,
            credit: round_money(ret.grand_total),
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{PaymentRecord, ReturnRecord, SaleRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(seq: i64, bill_no: &str, on: NaiveDate, net_amount: Decimal) -> SaleRecord {
        SaleRecord {
            id: Uuid::now_v7(),
            seq,
            bill_no: bill_no.to_string(),
            sale_date: on,
            net_amount,
            payment_ref: None,
        }
    }

    fn payment(seq: i64, on: NaiveDate, amount: Decimal) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::now_v7(),
            seq,
            payment_date: on,
            amount,
            payment_ref: None,
        }
    }

    fn sales_return(seq: i64, return_no: &str, on: NaiveDate, total: Decimal) -> ReturnRecord {
        ReturnRecord {
            id: Uuid::now_v7(),
            seq,
            return_no: return_no.to_string(),
            return_date: on,
            grand_total: total,
        }
    }

    /// Opening 100.00; sale 500.00; payment 200.00; return 50.00.
    fn worked_example() -> LedgerSources {
        LedgerSources {
            opening_balance: dec!(100.00),
            sales: vec![sale(1, "FS-2025-0001", date(2025, 1, 5), dec!(500.00))],
            payments: vec![payment(2, date(2025, 1, 10), dec!(200.00))],
            returns: vec![sales_return(3, "SR-2025-0001", date(2025, 1, 15), dec!(50.00))],
        }
    }

    #[test]
    fn test_worked_example_balances() {
        let statement = compute_statement(&worked_example(), DateRange::default()).unwrap();

        let kinds: Vec<EntryKind> = statement.lines.iter().map(|l| l.entry.kind).collect();
        assert_eq!(
            kinds,
            vec![EntryKind::Sale, EntryKind::Payment, EntryKind::Return]
        );

        let balances: Vec<Decimal> = statement.lines.iter().map(|l| l.balance).collect();
        assert_eq!(balances, vec![dec!(600.00), dec!(400.00), dec!(350.00)]);

        assert_eq!(statement.opening_balance, dec!(100.00));
        assert_eq!(statement.closing_balance, dec!(350.00));
        assert_eq!(statement.total_debit, dec!(500.00));
        assert_eq!(statement.total_credit, dec!(250.00));
    }

    #[test]
    fn test_empty_sources_echo_opening_balance() {
        let sources = LedgerSources {
            opening_balance: dec!(75.50),
            ..LedgerSources::default()
        };
        let statement = compute_statement(&sources, DateRange::default()).unwrap();

        assert!(statement.lines.is_empty());
        assert_eq!(statement.opening_balance, dec!(75.50));
        assert_eq!(statement.closing_balance, dec!(75.50));
        assert_eq!(statement.total_debit, Decimal::ZERO);
        assert_eq!(statement.total_credit, Decimal::ZERO);
    }

    #[test]
    fn test_same_day_ties_break_by_insertion_order() {
        let on = date(2025, 3, 1);
        let sources = LedgerSources {
            opening_balance: Decimal::ZERO,
            sales: vec![sale(4, "FS-2025-0002", on, dec!(100.00))],
            payments: vec![payment(2, on, dec!(30.00))],
            returns: vec![sales_return(3, "SR-2025-0001", on, dec!(10.00))],
        };

        let statement = compute_statement(&sources, DateRange::default()).unwrap();
        let seqs: Vec<i64> = statement.lines.iter().map(|l| l.entry.seq).collect();
        assert_eq!(seqs, vec![2, 3, 4]);
        assert_eq!(statement.closing_balance, dec!(60.00));
    }

    #[test]
    fn test_ranged_window_rolls_prior_entries_into_opening() {
        let sources = worked_example();

        // Window starting after the sale: opening = 100 + 500 = 600.
        let statement = compute_statement(
            &sources,
            DateRange {
                from: Some(date(2025, 1, 8)),
                to: None,
            },
        )
        .unwrap();

        assert_eq!(statement.opening_balance, dec!(600.00));
        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.closing_balance, dec!(350.00));
    }

    #[test]
    fn test_ranged_window_drops_entries_after_to() {
        let sources = worked_example();

        let statement = compute_statement(
            &sources,
            DateRange {
                from: None,
                to: Some(date(2025, 1, 12)),
            },
        )
        .unwrap();

        // The return on the 15th is outside the window.
        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.closing_balance, dec!(400.00));
        assert_eq!(statement.total_credit, dec!(200.00));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let result = compute_statement(
            &worked_example(),
            DateRange {
                from: Some(date(2025, 2, 1)),
                to: Some(date(2025, 1, 1)),
            },
        );
        assert!(matches!(result, Err(LedgerError::InvalidRange { .. })));
    }

    #[test]
    fn test_amounts_are_normalized_to_two_decimals() {
        let sources = LedgerSources {
            opening_balance: Decimal::ZERO,
            sales: vec![sale(1, "FS-2025-0001", date(2025, 1, 5), dec!(10.005))],
            ..LedgerSources::default()
        };

        let statement = compute_statement(&sources, DateRange::default()).unwrap();
        assert_eq!(statement.lines[0].entry.debit, dec!(10.01));
        assert_eq!(statement.closing_balance, dec!(10.01));
    }
}
