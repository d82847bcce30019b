use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use installment_core::payoff::{self, EarlyPayoffInput, EarlyPayoffQuote};
use installment_core::schedule::{self, LoanParameters};
use installment_core::types::{with_metadata, ComputationOutput};

use crate::commands::schedule::{resolve_loan, LoanArgs};
use crate::input;

/// Arguments for an early payoff quote
#[derive(Args)]
pub struct EarlyPayoffArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance to settle
    #[arg(long, alias = "balance")]
    pub remaining_balance: Option<Decimal>,

    /// Installments left on the original schedule
    #[arg(long)]
    pub remaining_months: Option<u32>,

    /// Nominal annual rate in percent (12 = 12%)
    #[arg(long, alias = "rate")]
    pub rate_percent: Option<Decimal>,
}

/// Arguments for a payoff quote taken from a generated schedule
#[derive(Args)]
pub struct PayoffAtArgs {
    /// Path to JSON loan file (overrides individual loan flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Number of installments already paid
    #[arg(long)]
    pub after_month: u32,
}

pub fn run_early_payoff(args: EarlyPayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payoff_input: EarlyPayoffInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        EarlyPayoffInput {
            remaining_balance: args
                .remaining_balance
                .ok_or("--remaining-balance is required (or provide --input)")?,
            remaining_months: args
                .remaining_months
                .ok_or("--remaining-months is required (or provide --input)")?,
            rate_percent: args.rate_percent.unwrap_or(Decimal::ZERO),
        }
    };

    let result = payoff::model_early_payoff(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_payoff_at(args: PayoffAtArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve_loan(args.input.as_deref(), &args.loan)?;
    let result = payoff_at(&params, args.after_month)?;
    Ok(serde_json::to_value(result)?)
}

fn payoff_at(
    params: &LoanParameters,
    after_month: u32,
) -> Result<ComputationOutput<EarlyPayoffQuote>, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let generated = schedule::generate_schedule(params)?;
    let quote = payoff::quote_from_schedule(&generated, after_month, params.rate_percent)?;
    log::debug!(
        "Payoff after month {} of {}: {}",
        after_month,
        params.months,
        quote.payoff_amount
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scheduled balance after the given month plus one period of interest",
        &json!({ "loan": params, "after_month": after_month }),
        Vec::new(),
        elapsed,
        quote,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payoff_at_uses_standard_envelope() {
        let params = LoanParameters {
            sum: dec!(10000),
            months: 12,
            rate_percent: dec!(12),
            first_payment: Decimal::ZERO,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 15),
        };
        let value = serde_json::to_value(payoff_at(&params, 1).unwrap()).unwrap();

        assert_eq!(value["result"]["payoff_amount"], json!("9303.63"));
        assert_eq!(value["assumptions"]["after_month"], json!(1));
        assert_eq!(value["assumptions"]["loan"]["months"], json!(12));
        assert_eq!(value["metadata"]["precision"], json!("rust_decimal_128bit"));
        assert!(value["warnings"].as_array().unwrap().is_empty());
    }
}
