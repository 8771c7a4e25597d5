//! Property-based tests for statement computation.
//!
//! - Closing-balance identity: closing == opening + debits - credits, exact
//! - Determinism: identical inputs produce identical statements
//! - Balance chain: every line's balance extends the previous one
//! - Range consistency: a bounded window opens at the running balance
//!   just before its start

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::statement::compute_statement;
use super::types::{DateRange, LedgerSources, PaymentRecord, ReturnRecord, SaleRecord};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Strategy to generate positive amounts in cents (0.01 to 10,000.00).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate an opening balance (may be negative: credit in
/// the customer's favor).
fn opening_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a day offset within a ~3 month window.
fn day_offset() -> impl Strategy<Value = i64> {
    0i64..90i64
}

/// Strategy to generate raw (day, amount) event pairs.
fn events_strategy(max: usize) -> impl Strategy<Value = Vec<(i64, Decimal)>> {
    prop::collection::vec((day_offset(), amount_strategy()), 0..=max)
}

/// Builds ledger sources from three raw event lists, assigning a unique
/// insertion-order key across all records.
fn build_sources(
    opening: Decimal,
    sales: &[(i64, Decimal)],
    payments: &[(i64, Decimal)],
    returns: &[(i64, Decimal)],
) -> LedgerSources {
    let mut seq = 0i64;
    let mut next_seq = || {
        seq += 1;
        seq
    };

    let sales = sales
        .iter()
        .map(|(day, amount)| {
            let seq = next_seq();
            SaleRecord {
                id: Uuid::now_v7(),
                seq,
                bill_no: format!("FS-2025-{seq:04}"),
                sale_date: base_date() + Duration::days(*day),
                net_amount: *amount,
                payment_ref: None,
            }
        })
        .collect();

    let payments = payments
        .iter()
        .map(|(day, amount)| PaymentRecord {
            id: Uuid::now_v7(),
            seq: next_seq(),
            payment_date: base_date() + Duration::days(*day),
            amount: *amount,
            payment_ref: None,
        })
        .collect();

    let returns = returns
        .iter()
        .map(|(day, amount)| {
            let seq = next_seq();
            ReturnRecord {
                id: Uuid::now_v7(),
                seq,
                return_no: format!("SR-2025-{seq:04}"),
                return_date: base_date() + Duration::days(*day),
                grand_total: *amount,
            }
        })
        .collect();

    LedgerSources {
        opening_balance: opening,
        sales,
        payments,
        returns,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// closing == opening + total_debit - total_credit, to the cent,
    /// for any mix of entries and any opening balance.
    #[test]
    fn prop_closing_balance_identity(
        opening in opening_strategy(),
        sales in events_strategy(20),
        payments in events_strategy(20),
        returns in events_strategy(10),
    ) {
        let sources = build_sources(opening, &sales, &payments, &returns);
        let statement = compute_statement(&sources, DateRange::default()).unwrap();

        prop_assert_eq!(
            statement.closing_balance,
            statement.opening_balance + statement.total_debit - statement.total_credit
        );
    }

    /// The identity also holds for every bounded window.
    #[test]
    fn prop_closing_balance_identity_in_window(
        opening in opening_strategy(),
        sales in events_strategy(15),
        payments in events_strategy(15),
        from_day in day_offset(),
        span in 0i64..90i64,
    ) {
        let sources = build_sources(opening, &sales, &payments, &[]);
        let range = DateRange {
            from: Some(base_date() + Duration::days(from_day)),
            to: Some(base_date() + Duration::days(from_day + span)),
        };
        let statement = compute_statement(&sources, range).unwrap();

        prop_assert_eq!(
            statement.closing_balance,
            statement.opening_balance + statement.total_debit - statement.total_credit
        );
    }

    /// Each line's balance equals the previous balance plus its net
    /// effect, starting from the opening balance.
    #[test]
    fn prop_balance_chain_is_consistent(
        opening in opening_strategy(),
        sales in events_strategy(15),
        payments in events_strategy(15),
        returns in events_strategy(8),
    ) {
        let sources = build_sources(opening, &sales, &payments, &returns);
        let statement = compute_statement(&sources, DateRange::default()).unwrap();

        let mut previous = statement.opening_balance;
        for line in &statement.lines {
            prop_assert_eq!(
                line.balance,
                previous + line.entry.debit - line.entry.credit
            );
            previous = line.balance;
        }
        prop_assert_eq!(statement.closing_balance, previous);
    }

    /// Recomputing against unchanged data returns an identical statement.
    #[test]
    fn prop_statement_is_deterministic(
        opening in opening_strategy(),
        sales in events_strategy(15),
        payments in events_strategy(15),
        returns in events_strategy(8),
    ) {
        let sources = build_sources(opening, &sales, &payments, &returns);

        let first = compute_statement(&sources, DateRange::default()).unwrap();
        let second = compute_statement(&sources, DateRange::default()).unwrap();

        prop_assert_eq!(first.lines.len(), second.lines.len());
        for (a, b) in first.lines.iter().zip(second.lines.iter()) {
            prop_assert_eq!(a.entry.id, b.entry.id);
            prop_assert_eq!(a.entry.seq, b.entry.seq);
            prop_assert_eq!(a.balance, b.balance);
        }
        prop_assert_eq!(first.opening_balance, second.opening_balance);
        prop_assert_eq!(first.closing_balance, second.closing_balance);
    }

    /// A window's opening balance equals the full statement's running
    /// balance just before the window starts.
    #[test]
    fn prop_range_opening_matches_full_running_balance(
        opening in opening_strategy(),
        sales in events_strategy(15),
        payments in events_strategy(15),
        returns in events_strategy(8),
        from_day in day_offset(),
    ) {
        let sources = build_sources(opening, &sales, &payments, &returns);
        let from = base_date() + Duration::days(from_day);

        let full = compute_statement(&sources, DateRange::default()).unwrap();
        let ranged = compute_statement(
            &sources,
            DateRange { from: Some(from), to: None },
        ).unwrap();

        let expected = full
            .lines
            .iter()
            .take_while(|line| line.entry.date < from)
            .last()
            .map_or(full.opening_balance, |line| line.balance);

        prop_assert_eq!(ranged.opening_balance, expected);
    }

    /// Entries ordered by date then insertion order, ascending.
    #[test]
    fn prop_entries_are_chronologically_ordered(
        opening in opening_strategy(),
        sales in events_strategy(15),
        payments in events_strategy(15),
        returns in events_strategy(8),
    ) {
        let sources = build_sources(opening, &sales, &payments, &returns);
        let statement = compute_statement(&sources, DateRange::default()).unwrap();

        for pair in statement.lines.windows(2) {
            let (a, b) = (&pair[0].entry, &pair[1].entry);
            prop_assert!(a.date < b.date || (a.date == b.date && a.seq < b.seq));
        }
    }
}
