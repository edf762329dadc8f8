//! Trip state transitions
//!
//! Every mutation of a trip is a [`TripCommand`] applied by a
//! [`TripReducer`], which returns the next snapshot and leaves the input
//! untouched. Storage then replaces the whole trip document.

use tracing::{debug, info};

use crate::traits::*;
use crate::trip::expense::{patterns, FixedCostParams};
use crate::types::*;

/// A change to a trip record
#[derive(Debug, Clone, PartialEq)]
pub enum TripCommand {
    AddParticipant(Participant),
    /// Replace name and contact of an existing participant
    UpdateParticipant(Participant),
    /// Expenses referring to the participant are left as they are
    RemoveParticipant { participant_id: ParticipantId },
    AddExpense(Expense),
    /// Replace an existing expense with the same id
    UpdateExpense(Expense),
    RemoveExpense { expense_id: String },
    /// Record a fixed cost, updating the previous record of the same cost
    SetFixedCost(FixedCostParams),
}

/// Kind of change, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripCommandKind {
    AddParticipant,
    UpdateParticipant,
    RemoveParticipant,
    AddExpense,
    UpdateExpense,
    RemoveExpense,
    SetFixedCost,
}

impl TripCommand {
    pub fn kind(&self) -> TripCommandKind {
        match self {
            TripCommand::AddParticipant(_) => TripCommandKind::AddParticipant,
            TripCommand::UpdateParticipant(_) => TripCommandKind::UpdateParticipant,
            TripCommand::RemoveParticipant { .. } => TripCommandKind::RemoveParticipant,
            TripCommand::AddExpense(_) => TripCommandKind::AddExpense,
            TripCommand::UpdateExpense(_) => TripCommandKind::UpdateExpense,
            TripCommand::RemoveExpense { .. } => TripCommandKind::RemoveExpense,
            TripCommand::SetFixedCost(_) => TripCommandKind::SetFixedCost,
        }
    }
}

/// Applies commands to trip snapshots
pub struct TripReducer {
    participant_validator: Box<dyn ParticipantValidator>,
    expense_validator: Box<dyn ExpenseValidator>,
}

impl Default for TripReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl TripReducer {
    /// Create a reducer with the default validators
    pub fn new() -> Self {
        Self {
            participant_validator: Box::new(DefaultParticipantValidator),
            expense_validator: Box::new(DefaultExpenseValidator),
        }
    }

    /// Create a reducer with custom validators
    pub fn with_validators(
        participant_validator: Box<dyn ParticipantValidator>,
        expense_validator: Box<dyn ExpenseValidator>,
    ) -> Self {
        Self {
            participant_validator,
            expense_validator,
        }
    }

    /// Apply one command, returning the next snapshot
    pub fn apply(&self, trip: &Trip, command: TripCommand) -> SettlementResult<Trip> {
        let kind = command.kind();
        let mut next = trip.clone();

        match command {
            TripCommand::AddParticipant(participant) => {
                self.participant_validator.validate_participant(&participant)?;
                if next.participant(&participant.id).is_some() {
                    return Err(SettlementError::Validation(format!(
                        "Participant with ID '{}' already exists",
                        participant.id
                    )));
                }
                next.participants.push(participant);
            }
            TripCommand::UpdateParticipant(participant) => {
                self.participant_validator.validate_participant(&participant)?;
                let slot = next
                    .participants
                    .iter_mut()
                    .find(|p| p.id == participant.id)
                    .ok_or_else(|| SettlementError::ParticipantNotFound(participant.id.clone()))?;
                *slot = participant;
            }
            TripCommand::RemoveParticipant { participant_id } => {
                let before = next.participants.len();
                next.participants.retain(|p| p.id != participant_id);
                if next.participants.len() == before {
                    return Err(SettlementError::ParticipantNotFound(participant_id));
                }
                let dangling = next
                    .expenses
                    .iter()
                    .filter(|e| e.is_paid_by(&participant_id) || e.is_split_with(&participant_id))
                    .count();
                if dangling > 0 {
                    info!(
                        trip_id = %next.id,
                        participant_id = %participant_id,
                        dangling,
                        "Participant removed; their expenses drop out of settlement"
                    );
                }
            }
            TripCommand::AddExpense(expense) => {
                self.check_expense(&next.participants, &expense)?;
                if next.expense(&expense.id).is_some() {
                    return Err(SettlementError::Validation(format!(
                        "Expense with ID '{}' already exists",
                        expense.id
                    )));
                }
                next.expenses.push(expense);
            }
            TripCommand::UpdateExpense(expense) => {
                self.check_expense(&next.participants, &expense)?;
                let slot = next
                    .expenses
                    .iter_mut()
                    .find(|e| e.id == expense.id)
                    .ok_or_else(|| SettlementError::ExpenseNotFound(expense.id.clone()))?;
                *slot = expense;
            }
            TripCommand::RemoveExpense { expense_id } => {
                let before = next.expenses.len();
                next.expenses.retain(|e| e.id != expense_id);
                if next.expenses.len() == before {
                    return Err(SettlementError::ExpenseNotFound(expense_id));
                }
            }
            TripCommand::SetFixedCost(params) => {
                self.set_fixed_cost(&mut next, params)?;
            }
        }

        debug!(trip_id = %next.id, command = ?kind, "Trip command applied");
        Ok(next)
    }

    /// Apply commands in order, stopping at the first failure
    pub fn apply_all<I>(&self, trip: &Trip, commands: I) -> SettlementResult<Trip>
    where
        I: IntoIterator<Item = TripCommand>,
    {
        commands
            .into_iter()
            .try_fold(trip.clone(), |current, command| self.apply(&current, command))
    }

    fn check_expense(
        &self,
        participants: &[Participant],
        expense: &Expense,
    ) -> SettlementResult<()> {
        self.expense_validator.validate_expense(expense)?;
        self.expense_validator
            .validate_participant_references(expense, participants)
    }

    fn set_fixed_cost(&self, trip: &mut Trip, params: FixedCostParams) -> SettlementResult<()> {
        let kind = params.kind;

        let candidate = if kind.is_shared() {
            let payer = params
                .participant_id
                .clone()
                .or_else(|| trip.participants.first().map(|p| p.id.clone()))
                .ok_or_else(|| {
                    SettlementError::Validation(
                        "A shared fixed cost needs at least one participant".to_string(),
                    )
                })?;
            patterns::shared_fixed_cost(
                kind,
                payer,
                &trip.participants,
                params.amount,
                params.currency,
                params.rates,
            )?
        } else {
            let owner = params.participant_id.clone().ok_or_else(|| {
                SettlementError::Validation(format!(
                    "Personal fixed cost '{}' needs a participant",
                    kind.tag()
                ))
            })?;
            patterns::personal_fixed_cost(
                kind,
                owner,
                params.amount,
                params.currency,
                params.rates,
            )?
        };

        let existing = trip.expenses.iter_mut().find(|e| {
            e.fixed_cost_kind() == Some(kind)
                && (kind.is_shared()
                    || params
                        .participant_id
                        .as_deref()
                        .is_some_and(|owner| e.is_paid_by(owner)))
        });

        match existing {
            Some(expense) => {
                expense.amount = candidate.amount;
                expense.currency = candidate.currency;
                expense.rates = candidate.rates;
                expense.split_between = candidate.split_between;
                self.check_expense(&trip.participants, expense)?;
            }
            None => {
                self.check_expense(&trip.participants, &candidate)?;
                trip.expenses.push(candidate);
            }
        }

        Ok(())
    }
}
