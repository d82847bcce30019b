//! Level-payment installment schedules.
//!
//! Turns a purchase sum, term, annual rate and optional down payment into a
//! month-by-month schedule. Amounts are rounded to cents at every step
//! (interest, principal part, balance) and the rounding drift that builds up
//! is absorbed by the final installment, which always pays off exactly the
//! remaining balance.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, trace, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::calendar;
use crate::error::InstallmentError;
use crate::money::{round_money, sum_money, CENT};
use crate::time_value::{level_payment, monthly_rate, period_interest};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, RatePercent};
use crate::InstallmentResult;

/// Longest accepted term (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Loan terms supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Total purchase price.
    pub sum: Money,
    /// Term in months.
    pub months: u32,
    /// Nominal annual rate in percent (12 = 12%).
    #[serde(default)]
    pub rate_percent: RatePercent,
    /// Down payment taken out of `sum` before amortization.
    #[serde(default)]
    pub first_payment: Money,
    /// Date of the first installment. Today (UTC) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// A manual change to an installment amount, recorded by the payment ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEdit {
    pub at: DateTime<Utc>,
    pub previous_amount: Money,
    pub new_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One month of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    /// Stable key for ledger events: the month number as a string.
    pub id: String,
    /// 1-based month index.
    pub month: u32,
    pub due_date: DateTime<Utc>,
    /// principal_part + interest.
    pub amount: Money,
    pub principal_part: Money,
    pub interest: Money,
    /// Outstanding principal after this installment.
    pub balance_after: Money,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub edits: Vec<PaymentEdit>,
}

/// Full schedule plus summary totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub first_payment: Money,
    /// sum - first_payment.
    pub principal: Money,
    /// Level payment, rounded once, before the final-month adjustment.
    pub monthly_payment: Money,
    /// Nominal total: first_payment + monthly_payment * months.
    pub total_to_pay: Money,
    /// Realized total: first_payment + sum of every entry's amount.
    pub actual_total: Money,
    pub total_interest: Money,
    /// Last entry's amount minus the level payment.
    pub final_adjustment: Money,
    pub schedule: Vec<PaymentScheduleEntry>,
}

/// Outstanding position after a given number of installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub after_month: u32,
    pub remaining_balance: Money,
    pub remaining_months: u32,
}

impl ScheduleResult {
    /// Balance left after `after_month` installments (0 = before the first).
    pub fn balance_snapshot(&self, after_month: u32) -> InstallmentResult<BalanceSnapshot> {
        let months = self.schedule.len() as u32;
        if after_month > months {
            return Err(InstallmentError::InvalidDuration(format!(
                "Month {after_month} is beyond the {months}-month schedule"
            )));
        }

        let remaining_balance = match after_month {
            0 => self.principal,
            m => self.schedule[(m - 1) as usize].balance_after,
        };

        Ok(BalanceSnapshot {
            after_month,
            remaining_balance,
            remaining_months: months - after_month,
        })
    }

    /// Look up an entry by its ledger id.
    pub fn entry(&self, id: &str) -> Option<&PaymentScheduleEntry> {
        self.schedule.iter().find(|e| e.id == id)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the month-by-month schedule for a loan.
///
/// Pure: identical parameters (with an explicit `start_date`) always produce
/// identical output.
pub fn generate_schedule(params: &LoanParameters) -> InstallmentResult<ScheduleResult> {
    validate_loan_parameters(params)?;

    let start_date = params.start_date.unwrap_or_else(calendar::today);
    // Last due date must be representable before anything is allocated
    calendar::due_date(start_date, params.months - 1)?;

    let principal = params.sum - params.first_payment;
    let rate = monthly_rate(params.rate_percent);
    let monthly_payment = round_money(level_payment(principal, rate, params.months)?);
    validate_level_payment(principal, monthly_payment, rate, params.months)?;

    debug!(
        "Amortizing {} over {} months at {}% (monthly rate {}): level payment {}",
        principal, params.months, params.rate_percent, rate, monthly_payment
    );

    let mut schedule = Vec::with_capacity(params.months as usize);
    let mut balance = principal;

    for month in 1..=params.months {
        let interest = period_interest(balance, rate);

        let principal_part = if month == params.months {
            balance_final_installment(balance)
        } else {
            round_money(monthly_payment - interest).min(balance)
        };

        let balance_after = round_money(balance - principal_part);
        if balance_after.is_zero() && month < params.months {
            return Err(InstallmentError::InvalidPrincipal(format!(
                "Principal {} is paid off at month {} of {}; rounding leaves later installments empty",
                principal, month, params.months
            )));
        }

        let entry = PaymentScheduleEntry {
            id: month.to_string(),
            month,
            due_date: calendar::due_date(start_date, month - 1)?,
            amount: round_money(principal_part + interest),
            principal_part,
            interest,
            balance_after,
            paid: false,
            paid_at: None,
            edits: Vec::new(),
        };
        trace!(
            "Month {}: amount {} = principal {} + interest {}, balance {}",
            entry.month,
            entry.amount,
            entry.principal_part,
            entry.interest,
            entry.balance_after
        );

        schedule.push(entry);
        balance = balance_after;
    }

    let months_dec = Decimal::from(params.months);
    let total_to_pay = round_money(params.first_payment + monthly_payment * months_dec);
    let actual_total = params.first_payment + sum_money(schedule.iter().map(|e| e.amount));
    let total_interest = sum_money(schedule.iter().map(|e| e.interest));
    let final_adjustment = schedule
        .last()
        .map(|e| e.amount - monthly_payment)
        .unwrap_or(Decimal::ZERO);

    debug!(
        "Schedule complete: nominal total {}, actual total {}",
        total_to_pay, actual_total
    );
    if !final_adjustment.is_zero() {
        warn!(
            "Final installment differs from level payment {} by {}",
            monthly_payment, final_adjustment
        );
    }

    Ok(ScheduleResult {
        first_payment: params.first_payment,
        principal,
        monthly_payment,
        total_to_pay,
        actual_total,
        total_interest,
        final_adjustment,
        schedule,
    })
}

/// Generate a schedule wrapped in the standard computation envelope.
pub fn model_schedule(
    params: &LoanParameters,
) -> InstallmentResult<ComputationOutput<ScheduleResult>> {
    let start = Instant::now();
    let result = generate_schedule(params)?;

    let mut warnings: Vec<String> = Vec::new();
    if params.start_date.is_none() {
        warnings.push("No start date given; schedule starts today (UTC)".into());
    }
    if !result.final_adjustment.is_zero() {
        warnings.push(format!(
            "Final installment adjusted by {} to close the balance exactly",
            result.final_adjustment
        ));
    }
    if result.total_to_pay != result.actual_total {
        warnings.push(format!(
            "Nominal total_to_pay {} differs from realized actual_total {}",
            result.total_to_pay, result.actual_total
        ));
    }

    let methodology = if params.rate_percent.is_zero() {
        "Equal principal division (zero rate), cent rounding per step, last installment balanced"
    } else {
        "Annuity level payment, cent rounding per step, last installment balanced"
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, params, warnings, elapsed, result))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_loan_parameters(params: &LoanParameters) -> InstallmentResult<()> {
    if params.months == 0 {
        return Err(InstallmentError::InvalidDuration(
            "Term must be at least 1 month".into(),
        ));
    }
    if params.months > MAX_TERM_MONTHS {
        return Err(InstallmentError::InvalidDuration(format!(
            "Term of {} months exceeds the {MAX_TERM_MONTHS}-month maximum",
            params.months
        )));
    }
    if params.sum <= Decimal::ZERO {
        return Err(InstallmentError::InvalidPrincipal(
            "Purchase sum must be positive".into(),
        ));
    }
    if params.first_payment < Decimal::ZERO {
        return Err(InstallmentError::InvalidDownPayment(
            "Down payment cannot be negative".into(),
        ));
    }
    if params.first_payment >= params.sum {
        return Err(InstallmentError::InvalidPrincipal(format!(
            "Down payment {} leaves nothing to finance out of {}",
            params.first_payment, params.sum
        )));
    }
    if params.rate_percent < Decimal::ZERO {
        return Err(InstallmentError::InvalidRate(
            "Annual rate cannot be negative".into(),
        ));
    }

    let principal = params.sum - params.first_payment;
    if principal < CENT * Decimal::from(params.months) {
        return Err(InstallmentError::InvalidPrincipal(format!(
            "Principal {} is less than one cent per month over {} months",
            principal, params.months
        )));
    }
    Ok(())
}

/// At a zero rate every installment but the last is the level payment, so
/// the first `months - 1` of them must leave something for the final one.
fn validate_level_payment(
    principal: Money,
    monthly_payment: Money,
    rate: Rate,
    months: u32,
) -> InstallmentResult<()> {
    if rate.is_zero() && monthly_payment * Decimal::from(months - 1) >= principal {
        return Err(InstallmentError::InvalidPrincipal(format!(
            "Level payment {} rounds up too far: {} installments already repay principal {}",
            monthly_payment,
            months - 1,
            principal
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Last-month policy: the final principal part is whatever balance remains,
/// so the schedule always ends at exactly zero.
fn balance_final_installment(balance: Money) -> Money {
    round_money(balance)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params(sum: Decimal, months: u32, rate: Decimal, first: Decimal) -> LoanParameters {
        LoanParameters {
            sum,
            months,
            rate_percent: rate,
            first_payment: first,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 15),
        }
    }

    #[test]
    fn test_zero_rate_even_split() {
        let result = generate_schedule(&params(dec!(12000), 12, dec!(0), dec!(0))).unwrap();
        assert_eq!(result.monthly_payment, dec!(1000.00));
        assert_eq!(result.schedule.len(), 12);
        for entry in &result.schedule {
            assert_eq!(entry.amount, dec!(1000.00));
            assert_eq!(entry.interest, Decimal::ZERO);
            assert_eq!(entry.principal_part, dec!(1000.00));
        }
        assert_eq!(result.schedule[11].balance_after, Decimal::ZERO);
        assert_eq!(result.final_adjustment, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_remainder_lands_on_last_month() {
        let result = generate_schedule(&params(dec!(100), 3, dec!(0), dec!(0))).unwrap();
        assert_eq!(result.monthly_payment, dec!(33.33));
        let amounts: Vec<Decimal> = result.schedule.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
        assert_eq!(result.final_adjustment, dec!(0.01));
        assert_eq!(result.total_to_pay, dec!(99.99));
        assert_eq!(result.actual_total, dec!(100.00));
    }

    #[test]
    fn test_annuity_level_payment() {
        let result = generate_schedule(&params(dec!(12000), 12, dec!(12), dec!(2000))).unwrap();
        assert_eq!(result.principal, dec!(10000));
        assert_eq!(result.monthly_payment, dec!(888.49));
        // First month: 1% of 10,000
        assert_eq!(result.schedule[0].interest, dec!(100.00));
        assert_eq!(result.schedule[0].principal_part, dec!(788.49));
        assert_eq!(result.schedule[0].balance_after, dec!(9211.51));
    }

    #[test]
    fn test_last_month_pays_remaining_balance() {
        let result = generate_schedule(&params(dec!(12000), 12, dec!(12), dec!(2000))).unwrap();
        let before_last = result.schedule[10].balance_after;
        let last = &result.schedule[11];
        assert_eq!(last.principal_part, before_last);
        assert_eq!(last.amount, last.principal_part + last.interest);
        assert_eq!(last.balance_after, Decimal::ZERO);
    }

    #[test]
    fn test_due_dates_monthly() {
        let result = generate_schedule(&params(dec!(3000), 3, dec!(0), dec!(0))).unwrap();
        let dates: Vec<String> = result
            .schedule
            .iter()
            .map(|e| e.due_date.date_naive().to_string())
            .collect();
        assert_eq!(dates, vec!["2026-01-15", "2026-02-15", "2026-03-15"]);
    }

    #[test]
    fn test_ledger_fields_initialized() {
        let result = generate_schedule(&params(dec!(500), 2, dec!(5), dec!(0))).unwrap();
        for (i, entry) in result.schedule.iter().enumerate() {
            assert_eq!(entry.id, (i + 1).to_string());
            assert!(!entry.paid);
            assert!(entry.paid_at.is_none());
            assert!(entry.edits.is_empty());
        }
    }

    #[test]
    fn test_single_month_term() {
        let result = generate_schedule(&params(dec!(1000), 1, dec!(12), dec!(0))).unwrap();
        assert_eq!(result.schedule.len(), 1);
        assert_eq!(result.monthly_payment, dec!(1010.00));
        assert_eq!(result.schedule[0].principal_part, dec!(1000));
        assert_eq!(result.schedule[0].interest, dec!(10.00));
        assert_eq!(result.schedule[0].amount, dec!(1010.00));
    }

    #[test]
    fn test_validation_zero_months() {
        let err = generate_schedule(&params(dec!(1000), 0, dec!(0), dec!(0))).unwrap_err();
        assert!(matches!(err, InstallmentError::InvalidDuration(_)));
    }

    #[test]
    fn test_validation_non_positive_sum() {
        let err = generate_schedule(&params(dec!(0), 12, dec!(0), dec!(0))).unwrap_err();
        assert!(matches!(err, InstallmentError::InvalidPrincipal(_)));
    }

    #[test]
    fn test_validation_down_payment_covers_sum() {
        let err = generate_schedule(&params(dec!(1000), 12, dec!(0), dec!(1000))).unwrap_err();
        assert!(matches!(err, InstallmentError::InvalidPrincipal(_)));
    }

    #[test]
    fn test_validation_negative_down_payment() {
        let err = generate_schedule(&params(dec!(1000), 12, dec!(0), dec!(-1))).unwrap_err();
        assert!(matches!(err, InstallmentError::InvalidDownPayment(_)));
    }

    #[test]
    fn test_validation_negative_rate() {
        let err = generate_schedule(&params(dec!(1000), 12, dec!(-0.5), dec!(0))).unwrap_err();
        assert!(matches!(err, InstallmentError::InvalidRate(_)));
    }

    #[test]
    fn test_validation_sub_cent_installments() {
        let err = generate_schedule(&params(dec!(0.05), 10, dec!(0), dec!(0))).unwrap_err();
        assert!(matches!(err, InstallmentError::InvalidPrincipal(_)));
    }

    #[test]
    fn test_rounded_up_level_payment_rejected() {
        // 361.80 / 360 = 1.005 -> 1.01; 359 * 1.01 = 362.59 clears the principal early
        let err = generate_schedule(&params(dec!(361.80), 360, dec!(0), dec!(0))).unwrap_err();
        assert!(
            matches!(err, InstallmentError::InvalidPrincipal(ref m) if m.contains("rounds up")),
            "got {:?}",
            err
        );
    }

    #[test]
    fn test_rounded_down_level_payment_accepted() {
        // 361.79 / 360 = 1.00497 -> 1.00; last installment carries 2.79
        let result = generate_schedule(&params(dec!(361.79), 360, dec!(0), dec!(0))).unwrap();
        assert_eq!(result.monthly_payment, dec!(1.00));
        assert_eq!(result.schedule[358].balance_after, dec!(2.79));
        assert_eq!(result.schedule[359].amount, dec!(2.79));
        assert_eq!(result.schedule[359].balance_after, Decimal::ZERO);
    }

    #[test]
    fn test_validation_term_above_maximum() {
        let err = generate_schedule(&params(dec!(1_000_000_000_000), u32::MAX, dec!(0), dec!(0)))
            .unwrap_err();
        assert!(matches!(err, InstallmentError::InvalidDuration(_)));

        let err = generate_schedule(&params(dec!(1_000_000), MAX_TERM_MONTHS + 1, dec!(0), dec!(0)))
            .unwrap_err();
        assert!(matches!(err, InstallmentError::InvalidDuration(_)));
    }

    #[test]
    fn test_maximum_term_accepted() {
        let result =
            generate_schedule(&params(dec!(120_000), MAX_TERM_MONTHS, dec!(0), dec!(0))).unwrap();
        assert_eq!(result.schedule.len(), MAX_TERM_MONTHS as usize);
        assert_eq!(result.monthly_payment, dec!(100.00));
    }

    #[test]
    fn test_last_due_date_out_of_range_rejected() {
        let mut loan = params(dec!(1200), 12, dec!(0), dec!(0));
        loan.start_date = Some(NaiveDate::MAX);
        let err = generate_schedule(&loan).unwrap_err();
        assert!(matches!(err, InstallmentError::DateOutOfRange(_)));
    }

    #[test]
    fn test_balance_snapshot() {
        let result = generate_schedule(&params(dec!(12000), 12, dec!(0), dec!(0))).unwrap();
        let snap = result.balance_snapshot(0).unwrap();
        assert_eq!(snap.remaining_balance, dec!(12000));
        assert_eq!(snap.remaining_months, 12);

        let snap = result.balance_snapshot(6).unwrap();
        assert_eq!(snap.remaining_balance, dec!(6000.00));
        assert_eq!(snap.remaining_months, 6);

        let snap = result.balance_snapshot(12).unwrap();
        assert!(snap.remaining_balance.is_zero());
        assert_eq!(snap.remaining_months, 0);

        assert!(matches!(
            result.balance_snapshot(13),
            Err(InstallmentError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_model_schedule_warnings() {
        let out = model_schedule(&params(dec!(100), 3, dec!(0), dec!(0))).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("Final installment adjusted")));
        assert!(out.warnings.iter().any(|w| w.contains("differs")));
        assert!(out.methodology.contains("zero rate"));
    }

    #[test]
    fn test_model_schedule_no_warnings_when_exact() {
        let out = model_schedule(&params(dec!(12000), 12, dec!(0), dec!(0))).unwrap();
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    }

    #[test]
    fn test_entry_lookup() {
        let result = generate_schedule(&params(dec!(1200), 12, dec!(0), dec!(0))).unwrap();
        assert_eq!(result.entry("7").map(|e| e.month), Some(7));
        assert!(result.entry("13").is_none());
    }
}
