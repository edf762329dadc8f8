//! Net balance per participant, in reference currency

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::currency::CurrencyNormalizer;
use crate::types::*;

/// Net position of one participant: positive is owed, negative owes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub participant_id: ParticipantId,
    pub amount: f64,
}

/// Balances for a whole roster, kept in roster order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Balances {
    entries: Vec<Balance>,
}

impl Balances {
    /// Every participant at zero, repeated ids collapsed to the first
    pub fn zeroed(participants: &[Participant]) -> Self {
        let mut seen = HashSet::with_capacity(participants.len());
        let mut entries: Vec<Balance> = Vec::with_capacity(participants.len());
        for participant in participants {
            if !seen.insert(participant.id.as_str()) {
                continue;
            }
            entries.push(Balance {
                participant_id: participant.id.clone(),
                amount: 0.0,
            });
        }
        Self { entries }
    }

    /// Balance of one participant
    pub fn get(&self, participant_id: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|b| b.participant_id == participant_id)
            .map(|b| b.amount)
    }

    /// Iterate balances in roster order
    pub fn iter(&self) -> std::slice::Iter<'_, Balance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every balance; zero up to float noise when money is conserved
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|b| b.amount).sum()
    }

    /// Balances keyed by participant id
    pub fn to_map(&self) -> HashMap<ParticipantId, f64> {
        self.entries
            .iter()
            .map(|b| (b.participant_id.clone(), b.amount))
            .collect()
    }

    /// Lookup table from participant id to position
    pub fn roster_index(&self) -> RosterIndex {
        let mut positions = HashMap::with_capacity(self.entries.len());
        for (position, balance) in self.entries.iter().enumerate() {
            positions
                .entry(balance.participant_id.clone())
                .or_insert(position);
        }
        RosterIndex { positions }
    }

    fn adjust(&mut self, index: usize, delta: f64) {
        self.entries[index].amount += delta;
    }
}

/// Position of each participant within a [`Balances`]
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    positions: HashMap<ParticipantId, usize>,
}

impl RosterIndex {
    pub fn position(&self, participant_id: &str) -> Option<usize> {
        self.positions.get(participant_id).copied()
    }

    pub fn contains(&self, participant_id: &str) -> bool {
        self.positions.contains_key(participant_id)
    }
}

impl<'a> IntoIterator for &'a Balances {
    type Item = &'a Balance;
    type IntoIter = std::slice::Iter<'a, Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Why an expense was left out of settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Flagged as paid collectively and kept out of peer debts
    ExcludedFromSettlement,
    /// Amount is zero, negative or not a number
    NonPositiveAmount,
    /// Nobody to split the amount between
    NoBeneficiaries,
    /// Payer or beneficiary missing from the roster
    UnknownParticipant(ParticipantId),
}

/// An expense that did not contribute to the balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedExpense {
    pub expense_id: String,
    pub reason: SkipReason,
}

/// Balances together with the expenses that were left out
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub balances: Balances,
    pub skipped: Vec<SkippedExpense>,
}

/// Decide whether an expense can take part in settlement
pub fn skip_reason(expense: &Expense, roster: &RosterIndex) -> Option<SkipReason> {
    if expense.excluded_from_settlement {
        return Some(SkipReason::ExcludedFromSettlement);
    }

    if !expense.amount.is_finite() || expense.amount <= 0.0 {
        return Some(SkipReason::NonPositiveAmount);
    }

    if expense.split_between.is_empty() {
        return Some(SkipReason::NoBeneficiaries);
    }

    expense
        .paid_by
        .iter()
        .chain(expense.split_between.iter())
        .find(|id| !roster.contains(id))
        .map(|id| SkipReason::UnknownParticipant(id.clone()))
}

/// Compute the net balance of every participant
///
/// Payers are credited an equal share of the converted total and
/// beneficiaries debited an equal share. Expenses that cannot be split are
/// skipped and reported; only missing or invalid rates are errors.
pub fn aggregate_balances(
    expenses: &[Expense],
    participants: &[Participant],
    normalizer: &CurrencyNormalizer,
) -> SettlementResult<BalanceSheet> {
    let mut balances = Balances::zeroed(participants);
    let roster = balances.roster_index();
    let mut skipped = Vec::new();

    for expense in expenses {
        if let Some(reason) = skip_reason(expense, &roster) {
            match &reason {
                SkipReason::ExcludedFromSettlement => {
                    debug!(expense_id = %expense.id, "Expense excluded from settlement");
                }
                other => {
                    warn!(expense_id = %expense.id, reason = ?other, "Skipping malformed expense");
                }
            }
            skipped.push(SkippedExpense {
                expense_id: expense.id.clone(),
                reason,
            });
            continue;
        }

        let total = normalizer.expense_in_reference(expense)?;
        let paid_share = total / expense.paid_by.len() as f64;
        let owed_share = total / expense.split_between.len() as f64;

        for payer in &expense.paid_by {
            if let Some(index) = roster.position(payer) {
                balances.adjust(index, paid_share);
            }
        }
        for beneficiary in &expense.split_between {
            if let Some(index) = roster.position(beneficiary) {
                balances.adjust(index, -owed_share);
            }
        }

        debug!(
            expense_id = %expense.id,
            total,
            payers = expense.paid_by.len(),
            beneficiaries = expense.split_between.len(),
            "Expense applied"
        );
    }

    Ok(BalanceSheet { balances, skipped })
}
