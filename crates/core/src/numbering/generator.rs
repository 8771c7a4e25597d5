//! Next-number derivation and the bounded-retry allocation protocol.
//!
//! Deriving the next number is a read of the latest number for the year
//! followed by an increment, which is not atomic on its own. The store
//! must therefore carry a unique constraint on the number column, and
//! allocation retries with a freshly derived number when an insert loses
//! the race.

use super::error::NumberingError;
use super::types::{DocumentKind, DocumentNumber};

/// How many times an insert is attempted before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 3;

/// Outcome of one insert attempt against the unique-constraint store.
#[derive(Debug)]
pub enum InsertOutcome<T> {
    /// The record was inserted under the candidate number.
    Inserted(T),
    /// The candidate number was taken by a concurrent writer.
    DuplicateNumber,
}

/// Derives the next document number for a year.
///
/// `last` is the number of the most recent record created in `year`
/// (by internal insertion order), or `None` when the year has no records
/// yet, in which case the sequence starts at 1. The year scope makes the
/// cross-year reset implicit: a new year never sees the old year's
/// numbers.
///
/// # Errors
///
/// Returns [`NumberingError::Malformed`] if `last` cannot be parsed.
pub fn next_in_year(
    kind: DocumentKind,
    year: i32,
    last: Option<&str>,
) -> Result<DocumentNumber, NumberingError> {
    match last {
        None => Ok(DocumentNumber::first(kind, year)),
        Some(value) => {
            let previous = DocumentNumber::parse(kind, value)?;
            Ok(DocumentNumber {
                kind,
                year,
                sequence: previous.sequence + 1,
            })
        }
    }
}

/// Allocates a document number against a unique-constraint store.
///
/// Each attempt re-reads the latest number via `fetch_last`, derives the
/// next candidate, and offers it to `try_insert`. A
/// [`InsertOutcome::DuplicateNumber`] outcome means a concurrent writer
/// claimed the candidate first; the loop then re-derives and retries, up
/// to [`MAX_ALLOCATION_ATTEMPTS`] times.
///
/// Callers that can wrap the read and the insert in one serializable
/// transaction never see a duplicate; the retry loop is the fallback
/// discipline for stores that only guarantee the unique constraint.
///
/// # Errors
///
/// Returns [`NumberingError::ConcurrencyConflict`] when every attempt
/// lost the race, or any error surfaced by the injected closures.
pub fn allocate_number<T, F, I>(
    kind: DocumentKind,
    year: i32,
    mut fetch_last: F,
    mut try_insert: I,
) -> Result<T, NumberingError>
where
    F: FnMut() -> Result<Option<String>, NumberingError>,
    I: FnMut(&DocumentNumber) -> Result<InsertOutcome<T>, NumberingError>,
{
    for _ in 0..MAX_ALLOCATION_ATTEMPTS {
        let last = fetch_last()?;
        let candidate = next_in_year(kind, year, last.as_deref())?;

        match try_insert(&candidate)? {
            InsertOutcome::Inserted(record) => return Ok(record),
            InsertOutcome::DuplicateNumber => {}
        }
    }

    Err(NumberingError::ConcurrencyConflict {
        attempts: MAX_ALLOCATION_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    #[test]
    fn test_first_number_of_year() {
        let number = next_in_year(DocumentKind::Order, 2025, None).unwrap();
        assert_eq!(number.to_string(), "ORD-2025-00001");
    }

    #[test]
    fn test_increments_latest_number() {
        let number = next_in_year(DocumentKind::SaleBill, 2025, Some("FS-2025-0041")).unwrap();
        assert_eq!(number.to_string(), "FS-2025-0042");
    }

    #[test]
    fn test_cross_year_reset() {
        // Year 2026 has no records: the 2025 high-water mark is invisible.
        let number = next_in_year(DocumentKind::SalesReturn, 2026, None).unwrap();
        assert_eq!(number.sequence, 1);
        assert_eq!(number.to_string(), "SR-2026-0001");
    }

    #[test]
    fn test_sequence_grows_past_pad_width() {
        let number = next_in_year(DocumentKind::Order, 2025, Some("ORD-2025-99999")).unwrap();
        assert_eq!(number.to_string(), "ORD-2025-100000");
    }

    #[test]
    fn test_malformed_latest_number_is_an_error() {
        let result = next_in_year(DocumentKind::Order, 2025, Some("ORD-2025-???"));
        assert!(matches!(result, Err(NumberingError::Malformed { .. })));
    }

    #[test]
    fn test_monotonic_run_of_consecutive_sequences() {
        let mut issued: Vec<DocumentNumber> = Vec::new();
        for _ in 0..50 {
            let last = issued.last().map(ToString::to_string);
            let next = next_in_year(DocumentKind::SaleBill, 2025, last.as_deref()).unwrap();
            issued.push(next);
        }

        let sequences: Vec<u32> = issued.iter().map(|n| n.sequence).collect();
        let expected: Vec<u32> = (1..=50).collect();
        assert_eq!(sequences, expected);
    }

    #[test]
    fn test_allocate_inserts_on_first_attempt() {
        let store: RefCell<BTreeSet<String>> = RefCell::new(BTreeSet::new());
        store.borrow_mut().insert("ORD-2025-00001".to_string());

        let allocated = allocate_number(
            DocumentKind::Order,
            2025,
            || Ok(store.borrow().iter().next_back().cloned()),
            |candidate| {
                let value = candidate.to_string();
                if store.borrow_mut().insert(value.clone()) {
                    Ok(InsertOutcome::Inserted(value))
                } else {
                    Ok(InsertOutcome::DuplicateNumber)
                }
            },
        )
        .unwrap();

        assert_eq!(allocated, "ORD-2025-00002");
    }

    #[test]
    fn test_allocate_retries_after_losing_race() {
        // The first insert attempt collides (a concurrent writer claimed
        // the candidate between fetch and insert); the second succeeds.
        let store: RefCell<BTreeSet<String>> = RefCell::new(BTreeSet::new());
        let mut raced = false;

        let allocated = allocate_number(
            DocumentKind::SaleBill,
            2025,
            || Ok(store.borrow().iter().next_back().cloned()),
            |candidate| {
                if !raced {
                    raced = true;
                    store.borrow_mut().insert(candidate.to_string());
                    return Ok(InsertOutcome::DuplicateNumber);
                }
                let value = candidate.to_string();
                store.borrow_mut().insert(value.clone());
                Ok(InsertOutcome::Inserted(value))
            },
        )
        .unwrap();

        assert_eq!(allocated, "FS-2025-0002");
    }

    #[test]
    fn test_allocate_gives_up_after_budget() {
        let mut attempts = 0u32;
        let result: Result<String, _> = allocate_number(
            DocumentKind::Order,
            2025,
            || Ok(None),
            |_| {
                attempts += 1;
                Ok(InsertOutcome::DuplicateNumber)
            },
        );

        assert_eq!(attempts, MAX_ALLOCATION_ATTEMPTS);
        assert!(matches!(
            result,
            Err(NumberingError::ConcurrencyConflict { attempts: 3 })
        ));
    }

    #[test]
    fn test_allocate_propagates_fetch_errors() {
        let result: Result<String, _> = allocate_number(
            DocumentKind::Order,
            2025,
            || Err(NumberingError::Storage("connection reset".to_string())),
            |_| Ok(InsertOutcome::DuplicateNumber),
        );
        assert!(matches!(result, Err(NumberingError::Storage(_))));
    }
}
