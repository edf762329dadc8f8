//! Trip-level totals for reporting

use serde::{Deserialize, Serialize};

use crate::currency::CurrencyNormalizer;
use crate::types::*;

/// Category tag used for expenses that carry none
pub const UNCATEGORIZED: &str = "other";

/// Consumption of one participant, in reference currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantTotal {
    pub participant_id: ParticipantId,
    pub name: String,
    pub amount: f64,
}

/// Spend in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    /// Percentage of the trip total
    pub share: f64,
}

/// Aggregate view of a trip
///
/// Unlike settlement, totals include expenses kept out of peer debts, such
/// as lodging paid upfront. Expenses without beneficiaries add to the totals
/// but to nobody's consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub total_reference: f64,
    pub total_local: f64,
    pub fixed_total: f64,
    pub purchase_total: f64,
    pub per_participant: Vec<ParticipantTotal>,
    pub categories: Vec<CategoryTotal>,
}

fn counts_toward_totals(expense: &Expense) -> bool {
    expense.amount.is_finite() && expense.amount > 0.0
}

impl TripSummary {
    /// Summarise a trip, converting expenses without a snapshot at `live_rates`
    pub fn compute(trip: &Trip, live_rates: &ConversionRates) -> SettlementResult<Self> {
        live_rates.validate()?;
        let normalizer = CurrencyNormalizer::new(Some(*live_rates));

        let mut total_reference = 0.0;
        let mut fixed_total = 0.0;
        let mut per_participant: Vec<ParticipantTotal> = trip
            .participants
            .iter()
            .map(|p| ParticipantTotal {
                participant_id: p.id.clone(),
                name: p.name.clone(),
                amount: 0.0,
            })
            .collect();
        let mut categories: Vec<CategoryTotal> = Vec::new();

        for expense in trip.expenses.iter().filter(|e| counts_toward_totals(e)) {
            let amount = normalizer.expense_in_reference(expense)?;
            total_reference += amount;

            if expense.fixed_cost_kind().is_some() {
                fixed_total += amount;
            }

            let tag = expense.category.as_deref().unwrap_or(UNCATEGORIZED);
            match categories.iter_mut().find(|c| c.category == tag) {
                Some(entry) => entry.amount += amount,
                None => categories.push(CategoryTotal {
                    category: tag.to_string(),
                    amount,
                    share: 0.0,
                }),
            }

            if expense.split_between.is_empty() {
                continue;
            }
            let share = amount / expense.split_between.len() as f64;
            for beneficiary in &expense.split_between {
                if let Some(entry) = per_participant
                    .iter_mut()
                    .find(|t| &t.participant_id == beneficiary)
                {
                    entry.amount += share;
                }
            }
        }

        for entry in &mut categories {
            entry.share = if total_reference > 0.0 {
                entry.amount / total_reference * 100.0
            } else {
                0.0
            };
        }
        // stable, so equal totals keep first-seen order
        categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        Ok(Self {
            total_reference,
            total_local: total_reference * live_rates.reference_to_local,
            fixed_total,
            purchase_total: total_reference - fixed_total,
            per_participant,
            categories,
        })
    }

    /// Consumption of one participant
    pub fn participant(&self, participant_id: &str) -> Option<f64> {
        self.per_participant
            .iter()
            .find(|t| t.participant_id == participant_id)
            .map(|t| t.amount)
    }
}

/// What one participant consumed over the trip, in reference currency
pub fn participant_share(
    trip: &Trip,
    participant_id: &str,
    live_rates: &ConversionRates,
) -> SettlementResult<f64> {
    TripSummary::compute(trip, live_rates)?
        .participant(participant_id)
        .ok_or_else(|| SettlementError::ParticipantNotFound(participant_id.to_string()))
}
