//! Money rounding helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts are `rust_decimal::Decimal` values normalized
//! to two fraction digits.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fraction digits carried by every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Normalizes an amount to two fraction digits.
///
/// Half-way values round away from zero, matching how the bills and
/// receipts are printed.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if the amount is a valid monetary value: finite scale of
/// at most two fraction digits and not negative.
#[must_use]
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount == round_money(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(10), dec!(10.00))]
    #[case(dec!(10.005), dec!(10.01))]
    #[case(dec!(10.004), dec!(10.00))]
    #[case(dec!(-10.005), dec!(-10.01))]
    #[case(dec!(0.1), dec!(0.10))]
    fn test_round_money(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_round_money_is_idempotent() {
        let amount = round_money(dec!(123.456));
        assert_eq!(round_money(amount), amount);
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(10.50), true)]
    #[case(dec!(10.505), false)]
    #[case(dec!(-0.01), false)]
    fn test_is_valid_amount(#[case] input: Decimal, #[case] expected: bool) {
        assert_eq!(is_valid_amount(input), expected);
    }
}
