//! Early payoff quotes.
//!
//! Settling a loan early costs the outstanding balance plus exactly one more
//! period of interest on it. The remaining term is carried through to the
//! quote but does not enter the formula.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::InstallmentError;
use crate::money::round_money;
use crate::schedule::ScheduleResult;
use crate::time_value::{monthly_rate, period_interest};
use crate::types::{with_metadata, ComputationOutput, Money, RatePercent};
use crate::InstallmentResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyPayoffInput {
    pub remaining_balance: Money,
    pub remaining_months: u32,
    #[serde(default)]
    pub rate_percent: RatePercent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyPayoffQuote {
    pub remaining_balance: Money,
    pub remaining_months: u32,
    /// One period of interest on the remaining balance.
    pub interest: Money,
    /// Amount due now for full settlement.
    pub payoff_amount: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amount due for immediate full settlement of `remaining_balance`.
pub fn recalc_for_early_payoff(
    remaining_balance: Money,
    remaining_months: u32,
    rate_percent: RatePercent,
) -> InstallmentResult<Money> {
    let quote = quote_early_payoff(&EarlyPayoffInput {
        remaining_balance,
        remaining_months,
        rate_percent,
    })?;
    Ok(quote.payoff_amount)
}

/// Early payoff with its interest breakdown.
pub fn quote_early_payoff(input: &EarlyPayoffInput) -> InstallmentResult<EarlyPayoffQuote> {
    validate_payoff_input(input)?;

    let interest = period_interest(input.remaining_balance, monthly_rate(input.rate_percent));
    let payoff_amount = round_money(input.remaining_balance + interest);

    debug!(
        "Early payoff of {} ({} months left) at {}%: interest {}, due {}",
        input.remaining_balance,
        input.remaining_months,
        input.rate_percent,
        interest,
        payoff_amount
    );

    Ok(EarlyPayoffQuote {
        remaining_balance: input.remaining_balance,
        remaining_months: input.remaining_months,
        interest,
        payoff_amount,
    })
}

/// Quote a payoff against the balance a schedule shows after `after_month`.
pub fn quote_from_schedule(
    schedule: &ScheduleResult,
    after_month: u32,
    rate_percent: RatePercent,
) -> InstallmentResult<EarlyPayoffQuote> {
    let snapshot = schedule.balance_snapshot(after_month)?;
    quote_early_payoff(&EarlyPayoffInput {
        remaining_balance: snapshot.remaining_balance,
        remaining_months: snapshot.remaining_months,
        rate_percent,
    })
}

/// Early payoff quote wrapped in the standard computation envelope.
pub fn model_early_payoff(
    input: &EarlyPayoffInput,
) -> InstallmentResult<ComputationOutput<EarlyPayoffQuote>> {
    let start = Instant::now();
    let quote = quote_early_payoff(input)?;

    let mut warnings: Vec<String> = Vec::new();
    if input.remaining_months == 0 && !input.remaining_balance.is_zero() {
        warnings.push("Balance outstanding with no months remaining".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Remaining balance plus one period of interest, cent rounding",
        input,
        warnings,
        elapsed,
        quote,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_payoff_input(input: &EarlyPayoffInput) -> InstallmentResult<()> {
    if input.remaining_balance < Decimal::ZERO {
        return Err(InstallmentError::InvalidPrincipal(
            "Remaining balance cannot be negative".into(),
        ));
    }
    if input.rate_percent < Decimal::ZERO {
        return Err(InstallmentError::InvalidRate(
            "Annual rate cannot be negative".into(),
        ));
    }
    Ok(())
}
