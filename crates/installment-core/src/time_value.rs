use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::InstallmentError;
use crate::money::round_money;
use crate::types::{Money, Rate, RatePercent};
use crate::InstallmentResult;

const PERCENT: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Periodic rate for monthly compounding: annual percent / 100 / 12.
pub fn monthly_rate(rate_percent: RatePercent) -> Rate {
    rate_percent / PERCENT / MONTHS_PER_YEAR
}

/// One period of interest on `balance`, rounded to cents.
pub fn period_interest(balance: Money, rate: Rate) -> Money {
    round_money(balance * rate)
}

/// Unrounded level payment that amortizes `principal` over `months` periods.
///
/// A zero rate is its own branch: the annuity factor `(1+r)^n - 1` is zero
/// there, so the principal is simply divided evenly.
pub fn level_payment(principal: Money, rate: Rate, months: u32) -> InstallmentResult<Money> {
    if months == 0 {
        return Err(InstallmentError::InvalidDuration(
            "Number of months must be > 0".into(),
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powu(u64::from(months))
        .ok_or_else(|| InstallmentError::ArithmeticOverflow {
            context: format!("compounding factor (1 + {rate})^{months}"),
        })?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(InstallmentError::ArithmeticOverflow {
            context: "annuity factor underflowed to zero".into(),
        });
    }

    let numerator = rate
        .checked_mul(factor)
        .and_then(|rf| principal.checked_mul(rf))
        .ok_or_else(|| InstallmentError::ArithmeticOverflow {
            context: "level payment numerator".into(),
        })?;

    Ok(numerator / denominator)
}
