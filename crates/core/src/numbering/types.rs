//! Document number domain types.

use serde::{Deserialize, Serialize};

use super::error::NumberingError;

/// The kinds of documents that carry a year-scoped reference number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Customer order (`ORD-YYYY-NNNNN`).
    Order,
    /// Sales bill (`FS-YYYY-NNNN`).
    SaleBill,
    /// Sales return (`SR-YYYY-NNNN`).
    SalesReturn,
}

impl DocumentKind {
    /// Returns the prefix printed before the year segment.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Order => "ORD",
            Self::SaleBill => "FS",
            Self::SalesReturn => "SR",
        }
    }

    /// Returns the minimum number of digits in the sequence segment.
    ///
    /// Sequences beyond this width widen; they are never truncated.
    #[must_use]
    pub const fn pad_width(self) -> usize {
        match self {
            Self::Order => 5,
            Self::SaleBill | Self::SalesReturn => 4,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::SaleBill => write!(f, "sale_bill"),
            Self::SalesReturn => write!(f, "sales_return"),
        }
    }
}

/// A parsed year-scoped document number.
///
/// The canonical rendering is `{PREFIX}-{YYYY}-{sequence}` with the
/// sequence zero-padded to the kind's width. Numbers are immutable once
/// assigned to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNumber {
    /// The document kind this number belongs to.
    pub kind: DocumentKind,
    /// The calendar year the record was created in.
    pub year: i32,
    /// The 1-based position within the year.
    pub sequence: u32,
}

impl DocumentNumber {
    /// Returns the first number of a year.
    #[must_use]
    pub const fn first(kind: DocumentKind, year: i32) -> Self {
        Self {
            kind,
            year,
            sequence: 1,
        }
    }

    /// Returns the number following this one within the same year.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            kind: self.kind,
            year: self.year,
            sequence: self.sequence + 1,
        }
    }

    /// Parses a stored document number of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`NumberingError::Malformed`] if the prefix does not match
    /// the kind, or the year/sequence segments are not numeric.
    pub fn parse(kind: DocumentKind, value: &str) -> Result<Self, NumberingError> {
        let malformed = || NumberingError::Malformed {
            value: value.to_string(),
        };

        let rest = value
            .strip_prefix(kind.prefix())
            .and_then(|r| r.strip_prefix('-'))
            .ok_or_else(malformed)?;

        let (year_part, seq_part) = rest.split_once('-').ok_or_else(malformed)?;
        if year_part.len() != 4 || seq_part.is_empty() {
            return Err(malformed());
        }

        let year: i32 = year_part.parse().map_err(|_| malformed())?;
        let sequence: u32 = seq_part.parse().map_err(|_| malformed())?;

        Ok(Self {
            kind,
            year,
            sequence,
        })
    }
}

impl std::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{:0width$}",
            self.kind.prefix(),
            self.year,
            self.sequence,
            width = self.kind.pad_width()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DocumentKind::Order, 2025, 1, "ORD-2025-00001")]
    #[case(DocumentKind::Order, 2025, 42, "ORD-2025-00042")]
    #[case(DocumentKind::SaleBill, 2025, 1, "FS-2025-0001")]
    #[case(DocumentKind::SalesReturn, 2024, 317, "SR-2024-0317")]
    fn test_display_zero_pads_to_width(
        #[case] kind: DocumentKind,
        #[case] year: i32,
        #[case] sequence: u32,
        #[case] expected: &str,
    ) {
        let number = DocumentNumber {
            kind,
            year,
            sequence,
        };
        assert_eq!(number.to_string(), expected);
    }

    #[test]
    fn test_display_widens_beyond_pad_width() {
        let number = DocumentNumber {
            kind: DocumentKind::Order,
            year: 2025,
            sequence: 123_456,
        };
        assert_eq!(number.to_string(), "ORD-2025-123456");

        let bill = DocumentNumber {
            kind: DocumentKind::SaleBill,
            year: 2025,
            sequence: 10_000,
        };
        assert_eq!(bill.to_string(), "FS-2025-10000");
    }

    #[rstest]
    #[case(DocumentKind::Order, "ORD-2025-00007", 2025, 7)]
    #[case(DocumentKind::SaleBill, "FS-2025-0001", 2025, 1)]
    #[case(DocumentKind::SalesReturn, "SR-2023-9999", 2023, 9999)]
    #[case(DocumentKind::Order, "ORD-2025-123456", 2025, 123_456)]
    fn test_parse_round_trip(
        #[case] kind: DocumentKind,
        #[case] value: &str,
        #[case] year: i32,
        #[case] sequence: u32,
    ) {
        let number = DocumentNumber::parse(kind, value).unwrap();
        assert_eq!(number.year, year);
        assert_eq!(number.sequence, sequence);
    }

    #[rstest]
    #[case("FS-2025-0001")] // wrong prefix for orders
    #[case("ORD-25-00001")] // two-digit year
    #[case("ORD-2025-")] // empty sequence
    #[case("ORD-2025-00A1")] // non-numeric sequence
    #[case("ORD2025-00001")] // missing separator
    #[case("")]
    fn test_parse_rejects_malformed(#[case] value: &str) {
        let result = DocumentNumber::parse(DocumentKind::Order, value);
        assert!(matches!(result, Err(NumberingError::Malformed { .. })));
    }

    #[test]
    fn test_first_and_next() {
        let first = DocumentNumber::first(DocumentKind::SaleBill, 2025);
        assert_eq!(first.sequence, 1);
        assert_eq!(first.next().sequence, 2);
        assert_eq!(first.next().year, first.year);
    }
}
