use chrono::{DateTime, Months, NaiveDate, Utc};

use crate::error::InstallmentError;
use crate::InstallmentResult;

/// Due date of the installment `offset_months` after `start`, at 00:00 UTC.
///
/// Month arithmetic clamps to the end of shorter months, so a loan started on
/// 31 January falls due on 28 (or 29) February.
pub fn due_date(start: NaiveDate, offset_months: u32) -> InstallmentResult<DateTime<Utc>> {
    let day = start
        .checked_add_months(Months::new(offset_months))
        .ok_or_else(|| {
            InstallmentError::DateOutOfRange(format!(
                "{start} + {offset_months} months is not representable"
            ))
        })?;
    Ok(start_of_day(day))
}

/// Midnight UTC of the given calendar day.
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Current UTC calendar date, used when a loan has no explicit start.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
