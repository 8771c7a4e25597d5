//! Property-based tests for document number generation.
//!
//! - Sequence monotonicity: consecutive integers starting at 1
//! - Round-trip: every rendered number parses back to itself
//! - Uniqueness under contention: concurrent writers with stale reads
//!   never leave two records with the same number

use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeSet;

use super::generator::{allocate_number, next_in_year, InsertOutcome};
use super::types::{DocumentKind, DocumentNumber};

/// Strategy to generate a document kind.
fn kind_strategy() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![
        Just(DocumentKind::Order),
        Just(DocumentKind::SaleBill),
        Just(DocumentKind::SalesReturn),
    ]
}

/// Strategy to generate a plausible calendar year.
fn year_strategy() -> impl Strategy<Value = i32> {
    2000i32..2100i32
}

/// Highest number currently in the store, if any.
fn store_max(store: &BTreeSet<String>) -> Option<String> {
    // Lexicographic max works within one kind/year because sequences of
    // equal width sort numerically and wider sequences sort after.
    store
        .iter()
        .max_by_key(|v| v.len())
        .map(|longest| {
            store
                .iter()
                .filter(|v| v.len() == longest.len())
                .next_back()
                .cloned()
                .unwrap_or_else(|| longest.clone())
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every rendered number parses back to the same kind/year/sequence.
    #[test]
    fn prop_format_parse_round_trip(
        kind in kind_strategy(),
        year in year_strategy(),
        sequence in 1u32..2_000_000u32,
    ) {
        let number = DocumentNumber { kind, year, sequence };
        let parsed = DocumentNumber::parse(kind, &number.to_string()).unwrap();
        prop_assert_eq!(parsed, number);
    }

    /// Repeated derivation yields consecutive integers starting at
    /// last-existing + 1 (or 1 for an empty year).
    #[test]
    fn prop_sequences_are_consecutive(
        kind in kind_strategy(),
        year in year_strategy(),
        start in prop::option::of(1u32..500_000u32),
        count in 1usize..60usize,
    ) {
        let mut last = start.map(|s| DocumentNumber { kind, year, sequence: s }.to_string());
        let first_expected = start.map_or(1, |s| s + 1);

        let mut sequences = Vec::with_capacity(count);
        for _ in 0..count {
            let next = next_in_year(kind, year, last.as_deref()).unwrap();
            sequences.push(next.sequence);
            last = Some(next.to_string());
        }

        let expected: Vec<u32> = (first_expected..first_expected + count as u32).collect();
        prop_assert_eq!(sequences, expected);
    }

    /// Writers racing on a shared store never produce duplicate numbers.
    ///
    /// Writers are grouped; every writer in a group first reads the same
    /// stale snapshot (the same-instant race from concurrent requests),
    /// so all but one of them collide on insert and must re-derive.
    #[test]
    fn prop_contended_writers_never_duplicate(
        kind in kind_strategy(),
        year in year_strategy(),
        group_sizes in prop::collection::vec(1usize..3usize, 1..12),
    ) {
        let store: RefCell<BTreeSet<String>> = RefCell::new(BTreeSet::new());
        let mut issued: Vec<String> = Vec::new();

        for group in &group_sizes {
            let snapshot = store_max(&store.borrow());

            for _ in 0..*group {
                let mut first_fetch = true;
                let snapshot = snapshot.clone();
                let allocated = allocate_number(
                    kind,
                    year,
                    || {
                        // First read is the shared stale snapshot; the
                        // retry path sees the live store.
                        if first_fetch {
                            first_fetch = false;
                            Ok(snapshot.clone())
                        } else {
                            Ok(store_max(&store.borrow()))
                        }
                    },
                    |candidate| {
                        let value = candidate.to_string();
                        if store.borrow_mut().insert(value.clone()) {
                            Ok(InsertOutcome::Inserted(value))
                        } else {
                            Ok(InsertOutcome::DuplicateNumber)
                        }
                    },
                ).unwrap();
                issued.push(allocated);
            }
        }

        // No duplicates: the store saw every issued number exactly once.
        let total: usize = group_sizes.iter().sum();
        prop_assert_eq!(issued.len(), total);
        prop_assert_eq!(store.borrow().len(), total);

        // And the issued sequences form the contiguous run 1..=total.
        let mut sequences: Vec<u32> = issued
            .iter()
            .map(|v| DocumentNumber::parse(kind, v).unwrap().sequence)
            .collect();
        sequences.sort_unstable();
        let expected: Vec<u32> = (1..=total as u32).collect();
        prop_assert_eq!(sequences, expected);
    }
}
