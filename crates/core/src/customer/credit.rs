//! Credit-limit rules derived from two stored customer fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer's credit position.
///
/// A `credit_limit` of zero means no limit is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditStanding {
    /// Maximum the customer may owe; zero disables enforcement.
    pub credit_limit: Decimal,
    /// Cached amount the customer currently owes.
    pub total_due: Decimal,
}

impl CreditStanding {
    /// Creates a credit standing from the stored fields.
    #[must_use]
    pub const fn new(credit_limit: Decimal, total_due: Decimal) -> Self {
        Self {
            credit_limit,
            total_due,
        }
    }

    /// Returns true if the customer owes more than their limit allows.
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        self.credit_limit > Decimal::ZERO && self.total_due > self.credit_limit
    }

    /// Returns how much further the customer may be extended.
    ///
    /// Zero when no limit is enforced or the limit is already consumed.
    #[must_use]
    pub fn available_credit(&self) -> Decimal {
        if self.credit_limit > Decimal::ZERO {
            (self.credit_limit - self.total_due).max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }

    /// Returns true if billing `amount` more would breach the limit.
    ///
    /// Always false when no limit is enforced.
    #[must_use]
    pub fn would_exceed(&self, amount: Decimal) -> bool {
        self.credit_limit > Decimal::ZERO && self.total_due + amount > self.credit_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1000), dec!(999.99), false)]
    #[case(dec!(1000), dec!(1000.00), false)]
    #[case(dec!(1000), dec!(1000.01), true)]
    #[case(dec!(0), dec!(1_000_000), false)] // no limit enforced
    fn test_is_over_limit(
        #[case] limit: Decimal,
        #[case] due: Decimal,
        #[case] expected: bool,
    ) {
        assert_eq!(CreditStanding::new(limit, due).is_over_limit(), expected);
    }

    #[rstest]
    #[case(dec!(1000), dec!(400), dec!(600))]
    #[case(dec!(1000), dec!(1200), dec!(0))] // already over: clamped
    #[case(dec!(0), dec!(400), dec!(0))] // no limit: nothing to report
    #[case(dec!(500), dec!(-100), dec!(600))] // customer in credit
    fn test_available_credit(
        #[case] limit: Decimal,
        #[case] due: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(CreditStanding::new(limit, due).available_credit(), expected);
    }

    #[rstest]
    #[case(dec!(1000), dec!(400), dec!(600), false)]
    #[case(dec!(1000), dec!(400), dec!(600.01), true)]
    #[case(dec!(0), dec!(400), dec!(1_000_000), false)]
    fn test_would_exceed(
        #[case] limit: Decimal,
        #[case] due: Decimal,
        #[case] amount: Decimal,
        #[case] expected: bool,
    ) {
        assert_eq!(
            CreditStanding::new(limit, due).would_exceed(amount),
            expected
        );
    }
}
