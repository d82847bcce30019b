//! Append-only payment ledger for a generated schedule.
//!
//! The generator hands out entries with `paid = false`, no `paid_at` and an
//! empty `edits` list and never touches them again. Whatever layer persists
//! a schedule keeps one of these ledgers next to it: real-world payment
//! events are appended here, keyed by entry id, and projected onto a copy of
//! the schedule on demand. Events are never removed or rewritten; undoing a
//! payment is itself an event.

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::InstallmentError;
use crate::money::sum_money;
use crate::schedule::{PaymentEdit, ScheduleResult};
use crate::types::Money;
use crate::InstallmentResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    PaymentRecorded {
        entry_id: String,
        at: DateTime<Utc>,
    },
    PaymentReverted {
        entry_id: String,
        at: DateTime<Utc>,
    },
    AmountEdited {
        entry_id: String,
        previous_amount: Money,
        new_amount: Money,
        at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl LedgerEvent {
    pub fn entry_id(&self) -> &str {
        match self {
            LedgerEvent::PaymentRecorded { entry_id, .. }
            | LedgerEvent::PaymentReverted { entry_id, .. }
            | LedgerEvent::AmountEdited { entry_id, .. } => entry_id,
        }
    }
}

/// Event log for one schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentLedger {
    /// Scheduled amount per entry id, as generated.
    scheduled: BTreeMap<String, Money>,
    events: Vec<LedgerEvent>,
}

/// Next unpaid installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextDue {
    pub entry_id: String,
    pub month: u32,
    pub due_date: DateTime<Utc>,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub paid_count: u32,
    pub unpaid_count: u32,
    pub amount_paid: Money,
    pub amount_outstanding: Money,
    pub next_due: Option<NextDue>,
}

/// Replayed state of one entry.
#[derive(Debug, Clone, Copy)]
struct EntryState {
    paid: bool,
    amount: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl PaymentLedger {
    /// Empty ledger accepting events for the entries of `schedule`.
    pub fn for_schedule(schedule: &ScheduleResult) -> Self {
        let scheduled = schedule
            .schedule
            .iter()
            .map(|e| (e.id.clone(), e.amount))
            .collect();
        PaymentLedger {
            scheduled,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn events_for<'a>(&'a self, entry_id: &'a str) -> impl Iterator<Item = &'a LedgerEvent> {
        self.events.iter().filter(move |e| e.entry_id() == entry_id)
    }

    /// Mark an installment paid.
    pub fn record_payment(&mut self, entry_id: &str, at: DateTime<Utc>) -> InstallmentResult<()> {
        let state = self.state_of(entry_id)?;
        if state.paid {
            return Err(InstallmentError::AlreadyPaid(entry_id.to_string()));
        }
        debug!("Installment {} paid at {}", entry_id, at);
        self.events.push(LedgerEvent::PaymentRecorded {
            entry_id: entry_id.to_string(),
            at,
        });
        Ok(())
    }

    /// Undo a recorded payment.
    pub fn revert_payment(&mut self, entry_id: &str, at: DateTime<Utc>) -> InstallmentResult<()> {
        let state = self.state_of(entry_id)?;
        if !state.paid {
            return Err(InstallmentError::NotPaid(entry_id.to_string()));
        }
        debug!("Installment {} payment reverted at {}", entry_id, at);
        self.events.push(LedgerEvent::PaymentReverted {
            entry_id: entry_id.to_string(),
            at,
        });
        Ok(())
    }

    /// Change the amount due on an unpaid installment.
    ///
    /// Only `amount` changes; the principal/interest split of the entry keeps
    /// describing the original plan.
    pub fn edit_amount(
        &mut self,
        entry_id: &str,
        new_amount: Money,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> InstallmentResult<()> {
        let state = self.state_of(entry_id)?;
        if state.paid {
            return Err(InstallmentError::AlreadyPaid(entry_id.to_string()));
        }
        if new_amount < Decimal::ZERO {
            return Err(InstallmentError::InvalidAmount {
                entry_id: entry_id.to_string(),
                reason: "Amount cannot be negative".into(),
            });
        }
        if new_amount == state.amount {
            return Err(InstallmentError::InvalidAmount {
                entry_id: entry_id.to_string(),
                reason: format!("Amount is already {new_amount}"),
            });
        }
        debug!(
            "Installment {} amount {} -> {} at {}",
            entry_id, state.amount, new_amount, at
        );
        self.events.push(LedgerEvent::AmountEdited {
            entry_id: entry_id.to_string(),
            previous_amount: state.amount,
            new_amount,
            at,
            note,
        });
        Ok(())
    }

    /// Project every event onto a copy of `schedule`.
    ///
    /// `actual_total` is recomputed from the edited amounts; the nominal
    /// totals still describe the generated plan.
    pub fn apply(&self, schedule: &ScheduleResult) -> InstallmentResult<ScheduleResult> {
        let mut projected = schedule.clone();

        for event in &self.events {
            let entry = projected
                .schedule
                .iter_mut()
                .find(|e| e.id == event.entry_id())
                .ok_or_else(|| InstallmentError::UnknownEntry(event.entry_id().to_string()))?;

            match event {
                LedgerEvent::PaymentRecorded { at, .. } => {
                    entry.paid = true;
                    entry.paid_at = Some(*at);
                }
                LedgerEvent::PaymentReverted { .. } => {
                    entry.paid = false;
                    entry.paid_at = None;
                }
                LedgerEvent::AmountEdited {
                    previous_amount,
                    new_amount,
                    at,
                    note,
                    ..
                } => {
                    entry.amount = *new_amount;
                    entry.edits.push(PaymentEdit {
                        at: *at,
                        previous_amount: *previous_amount,
                        new_amount: *new_amount,
                        note: note.clone(),
                    });
                }
            }
        }

        projected.actual_total =
            projected.first_payment + sum_money(projected.schedule.iter().map(|e| e.amount));
        Ok(projected)
    }

    /// Paid/outstanding position of `schedule` under this ledger.
    pub fn summary(&self, schedule: &ScheduleResult) -> InstallmentResult<LedgerSummary> {
        let projected = self.apply(schedule)?;
        let (paid, unpaid): (Vec<_>, Vec<_>) = projected.schedule.iter().partition(|e| e.paid);

        let next_due = unpaid
            .iter()
            .min_by_key(|e| e.month)
            .map(|e| NextDue {
                entry_id: e.id.clone(),
                month: e.month,
                due_date: e.due_date,
                amount: e.amount,
            });

        Ok(LedgerSummary {
            paid_count: paid.len() as u32,
            unpaid_count: unpaid.len() as u32,
            amount_paid: sum_money(paid.iter().map(|e| e.amount)),
            amount_outstanding: sum_money(unpaid.iter().map(|e| e.amount)),
            next_due,
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn state_of(&self, entry_id: &str) -> InstallmentResult<EntryState> {
        let scheduled = self
            .scheduled
            .get(entry_id)
            .copied()
            .ok_or_else(|| InstallmentError::UnknownEntry(entry_id.to_string()))?;

        let state = self.events_for(entry_id).fold(
            EntryState {
                paid: false,
                amount: scheduled,
            },
            |state, event| match event {
                LedgerEvent::PaymentRecorded { .. } => EntryState { paid: true, ..state },
                LedgerEvent::PaymentReverted { .. } => EntryState { paid: false, ..state },
                LedgerEvent::AmountEdited { new_amount, .. } => EntryState {
                    amount: *new_amount,
                    ..state
                },
            },
        );
        Ok(state)
    }
}
