pub mod ledger;
pub mod payoff;
pub mod schedule;
