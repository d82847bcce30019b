use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use installment_core::schedule::{self, LoanParameters};

use crate::input;

/// Loan terms shared by every command that builds a schedule
#[derive(Args)]
pub struct LoanArgs {
    /// Total purchase price
    #[arg(long)]
    pub sum: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Nominal annual rate in percent (12 = 12%)
    #[arg(long, alias = "rate")]
    pub rate_percent: Option<Decimal>,

    /// Down payment
    #[arg(long, alias = "down-payment")]
    pub first_payment: Option<Decimal>,

    /// Date of the first installment (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl LoanArgs {
    /// Build loan parameters from flags.
    pub fn to_parameters(&self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        Ok(LoanParameters {
            sum: self.sum.ok_or("--sum is required (or provide --input)")?,
            months: self.months.ok_or("--months is required (or provide --input)")?,
            rate_percent: self.rate_percent.unwrap_or(Decimal::ZERO),
            first_payment: self.first_payment.unwrap_or(Decimal::ZERO),
            start_date: self.start_date,
        })
    }
}

/// Arguments for schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Resolve loan parameters from an input file, piped stdin, or flags.
pub fn resolve_loan(
    input_path: Option<&str>,
    loan: &LoanArgs,
) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    if let Some(path) = input_path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        loan.to_parameters()
    }
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve_loan(args.input.as_deref(), &args.loan)?;
    log::debug!("Generating schedule for {:?}", params);

    let result = schedule::model_schedule(&params)?;
    Ok(serde_json::to_value(result)?)
}
