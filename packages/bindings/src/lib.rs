use chrono::{DateTime, Utc};
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use installment_core::ledger::PaymentLedger;
use installment_core::payoff::{self, EarlyPayoffInput};
use installment_core::schedule::{self, LoanParameters, ScheduleResult};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::model_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Early payoff
// ---------------------------------------------------------------------------

#[napi]
pub fn recalc_for_early_payoff(input_json: String) -> NapiResult<String> {
    let input: EarlyPayoffInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = payoff::model_early_payoff(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ScheduledPayoffRequest {
    schedule: ScheduleResult,
    after_month: u32,
    #[serde(default)]
    rate_percent: Decimal,
}

#[napi]
pub fn quote_from_schedule(input_json: String) -> NapiResult<String> {
    let req: ScheduledPayoffRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let quote = payoff::quote_from_schedule(&req.schedule, req.after_month, req.rate_percent)
        .map_err(to_napi_error)?;
    serde_json::to_string(&quote).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Payment ledger
// ---------------------------------------------------------------------------

fn parse_ledger_pair(
    schedule_json: &str,
    ledger_json: &str,
) -> NapiResult<(ScheduleResult, PaymentLedger)> {
    let schedule: ScheduleResult = serde_json::from_str(schedule_json).map_err(to_napi_error)?;
    let ledger: PaymentLedger = serde_json::from_str(ledger_json).map_err(to_napi_error)?;
    Ok((schedule, ledger))
}

#[napi]
pub fn new_ledger(schedule_json: String) -> NapiResult<String> {
    let schedule: ScheduleResult = serde_json::from_str(&schedule_json).map_err(to_napi_error)?;
    serde_json::to_string(&PaymentLedger::for_schedule(&schedule)).map_err(to_napi_error)
}

fn parse_instant(at: &str) -> NapiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(to_napi_error)
}

fn update_ledger(
    ledger_json: &str,
    update: impl FnOnce(&mut PaymentLedger) -> installment_core::InstallmentResult<()>,
) -> NapiResult<String> {
    let mut ledger: PaymentLedger = serde_json::from_str(ledger_json).map_err(to_napi_error)?;
    update(&mut ledger).map_err(to_napi_error)?;
    serde_json::to_string(&ledger).map_err(to_napi_error)
}

#[napi]
pub fn record_payment(ledger_json: String, entry_id: String, at: String) -> NapiResult<String> {
    let at = parse_instant(&at)?;
    update_ledger(&ledger_json, |l| l.record_payment(&entry_id, at))
}

#[napi]
pub fn revert_payment(ledger_json: String, entry_id: String, at: String) -> NapiResult<String> {
    let at = parse_instant(&at)?;
    update_ledger(&ledger_json, |l| l.revert_payment(&entry_id, at))
}

#[napi]
pub fn edit_amount(
    ledger_json: String,
    entry_id: String,
    new_amount: String,
    at: String,
    note: Option<String>,
) -> NapiResult<String> {
    let at = parse_instant(&at)?;
    let new_amount: Decimal = new_amount.parse().map_err(to_napi_error)?;
    update_ledger(&ledger_json, |l| l.edit_amount(&entry_id, new_amount, at, note))
}

#[napi]
pub fn apply_ledger(schedule_json: String, ledger_json: String) -> NapiResult<String> {
    let (schedule, ledger) = parse_ledger_pair(&schedule_json, &ledger_json)?;
    let projected = ledger.apply(&schedule).map_err(to_napi_error)?;
    serde_json::to_string(&projected).map_err(to_napi_error)
}

#[napi]
pub fn ledger_summary(schedule_json: String, ledger_json: String) -> NapiResult<String> {
    let (schedule, ledger) = parse_ledger_pair(&schedule_json, &ledger_json)?;
    let summary = ledger.summary(&schedule).map_err(to_napi_error)?;
    serde_json::to_string(&summary).map_err(to_napi_error)
}
