//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for trip records
///
/// Trips are stored as whole documents: `save_trip` replaces whatever was
/// stored under the same id, so concurrent writers resolve last-write-wins.
/// Implement this for whatever persistence or sync layer the host uses.
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Insert or replace a trip
    async fn save_trip(&mut self, trip: &Trip) -> SettlementResult<()>;

    /// Get a trip by ID
    async fn get_trip(&self, trip_id: &str) -> SettlementResult<Option<Trip>>;

    /// List every stored trip
    async fn list_trips(&self) -> SettlementResult<Vec<Trip>>;

    /// Delete a trip
    async fn delete_trip(&mut self, trip_id: &str) -> SettlementResult<()>;
}

/// Trait for implementing custom expense validation rules
pub trait ExpenseValidator: Send + Sync {
    /// Validate an expense before it enters a trip
    fn validate_expense(&self, expense: &Expense) -> SettlementResult<()>;

    /// Validate that every payer and beneficiary is on the roster
    fn validate_participant_references(
        &self,
        expense: &Expense,
        participants: &[Participant],
    ) -> SettlementResult<()>;
}

/// Trait for implementing custom participant validation rules
pub trait ParticipantValidator: Send + Sync {
    /// Validate a participant before it joins or is updated
    fn validate_participant(&self, participant: &Participant) -> SettlementResult<()>;
}

/// Default expense validator with the rules settlement depends on
pub struct DefaultExpenseValidator;

impl ExpenseValidator for DefaultExpenseValidator {
    fn validate_expense(&self, expense: &Expense) -> SettlementResult<()> {
        if expense.description.trim().is_empty() {
            return Err(SettlementError::Validation(
                "Expense description cannot be empty".to_string(),
            ));
        }

        if !expense.amount.is_finite() || expense.amount <= 0.0 {
            return Err(SettlementError::Validation(
                "Expense amount must be positive".to_string(),
            ));
        }

        if expense.split_between.is_empty() {
            return Err(SettlementError::Validation(
                "Expense must be split between at least one participant".to_string(),
            ));
        }

        if let Some(rates) = &expense.rates {
            rates.validate()?;
        }

        Ok(())
    }

    fn validate_participant_references(
        &self,
        expense: &Expense,
        participants: &[Participant],
    ) -> SettlementResult<()> {
        for id in expense.paid_by.iter().chain(expense.split_between.iter()) {
            if !participants.iter().any(|p| &p.id == id) {
                return Err(SettlementError::ParticipantNotFound(id.clone()));
            }
        }
        Ok(())
    }
}

/// Default participant validator with basic rules
pub struct DefaultParticipantValidator;

impl ParticipantValidator for DefaultParticipantValidator {
    fn validate_participant(&self, participant: &Participant) -> SettlementResult<()> {
        if participant.id.trim().is_empty() {
            return Err(SettlementError::Validation(
                "Participant ID cannot be empty".to_string(),
            ));
        }

        if participant.name.trim().is_empty() {
            return Err(SettlementError::Validation(
                "Participant name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
