//! Cent rounding for every monetary quantity the engine produces.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::Money;

/// Fractional digits kept on every monetary amount.
pub const MONEY_DP: u32 = 2;

/// Smallest representable amount (one cent).
pub const CENT: Decimal = dec!(0.01);

/// Round to whole cents, half away from zero.
///
/// This is the only rounding rule used on money paths. For the non-negative
/// amounts the engine produces it is ordinary round-half-up.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum a sequence of amounts. Inputs are expected to be already rounded.
pub fn sum_money<I: IntoIterator<Item = Money>>(amounts: I) -> Money {
    amounts.into_iter().fold(Decimal::ZERO, |acc, m| acc + m)
}
