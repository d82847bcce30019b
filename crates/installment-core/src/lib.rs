pub mod calendar;
pub mod error;
pub mod money;
pub mod payoff;
pub mod schedule;
pub mod time_value;
pub mod types;

#[cfg(feature = "ledger")]
pub mod ledger;

pub use error::InstallmentError;
pub use payoff::{quote_early_payoff, quote_from_schedule, recalc_for_early_payoff};
pub use schedule::{generate_schedule, LoanParameters, PaymentScheduleEntry, ScheduleResult};
pub use types::*;

/// Standard result type for all installment operations
pub type InstallmentResult<T> = Result<T, InstallmentError>;
