use clap::Args;
use serde_json::{json, Value};
use std::time::Instant;

use installment_core::ledger::PaymentLedger;
use installment_core::types::with_metadata;
use installment_core::ScheduleResult;

use crate::input;

/// Arguments for projecting a ledger onto a schedule
#[derive(Args)]
pub struct ApplyLedgerArgs {
    /// Schedule JSON, either a bare schedule or a `schedule` command output
    #[arg(long)]
    pub schedule: String,

    /// Ledger JSON holding the recorded payment events
    #[arg(long)]
    pub ledger: String,

    /// Print only the paid/outstanding summary
    #[arg(long)]
    pub summary: bool,
}

pub fn run_apply_ledger(args: ApplyLedgerArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule = read_schedule(&args.schedule)?;
    let ledger: PaymentLedger = input::file::read_json(&args.ledger)?;
    let assumptions = json!({
        "schedule": args.schedule,
        "ledger": args.ledger,
        "summary": args.summary,
    });
    apply_ledger(&schedule, &ledger, args.summary, assumptions)
}

fn apply_ledger(
    schedule: &ScheduleResult,
    ledger: &PaymentLedger,
    summary: bool,
    mut assumptions: Value,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    log::debug!(
        "Applying {} ledger events to a {}-month schedule",
        ledger.events().len(),
        schedule.schedule.len()
    );
    assumptions["events"] = json!(ledger.events().len());

    let (methodology, result) = if summary {
        (
            "Ledger events replayed in order and summarised against the schedule",
            serde_json::to_value(ledger.summary(schedule)?)?,
        )
    } else {
        (
            "Ledger events replayed in order onto a copy of the schedule",
            serde_json::to_value(ledger.apply(schedule)?)?,
        )
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(methodology, &assumptions, Vec::new(), elapsed, result);
    Ok(serde_json::to_value(output)?)
}

/// Accept either a bare schedule or one wrapped in the output envelope.
fn read_schedule(path: &str) -> Result<ScheduleResult, Box<dyn std::error::Error>> {
    let value = input::file::read_json_value(path)?;
    let inner = match value {
        Value::Object(mut map) if map.contains_key("result") => map
            .remove("result")
            .ok_or("schedule envelope has no result")?,
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use installment_core::schedule::{generate_schedule, LoanParameters};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample() -> (ScheduleResult, PaymentLedger) {
        let schedule = generate_schedule(&LoanParameters {
            sum: dec!(300),
            months: 3,
            rate_percent: Decimal::ZERO,
            first_payment: Decimal::ZERO,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 15),
        })
        .unwrap();
        let mut ledger = PaymentLedger::for_schedule(&schedule);
        let at = NaiveDate::from_ymd_opt(2026, 1, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc();
        ledger.record_payment("1", at).unwrap();
        (schedule, ledger)
    }

    fn assert_envelope(value: &Value) {
        for key in ["result", "methodology", "assumptions", "warnings", "metadata"] {
            assert!(value.get(key).is_some(), "missing {key} in {value}");
        }
        assert_eq!(value["assumptions"]["events"], json!(1));
        assert_eq!(value["metadata"]["precision"], json!("rust_decimal_128bit"));
    }

    #[test]
    fn test_applied_schedule_uses_standard_envelope() {
        let (schedule, ledger) = sample();
        let value = apply_ledger(&schedule, &ledger, false, json!({ "summary": false })).unwrap();
        assert_envelope(&value);
        assert_eq!(value["assumptions"]["summary"], json!(false));
        assert_eq!(value["result"]["schedule"][0]["paid"], json!(true));
    }

    #[test]
    fn test_summary_uses_standard_envelope() {
        let (schedule, ledger) = sample();
        let value = apply_ledger(&schedule, &ledger, true, json!({ "summary": true })).unwrap();
        assert_envelope(&value);
        assert_eq!(value["result"]["paid_count"], json!(1));
    }
}
