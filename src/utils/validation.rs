//! Validation utilities

use std::collections::HashSet;

use crate::traits::*;
use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: f64) -> SettlementResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        Err(SettlementError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Minimum digits in a contact key once formatting is stripped
pub const MIN_CONTACT_LEN: usize = 9;

/// Participant ids are opaque keys: generated UUIDs or short slugs
pub fn validate_participant_id(participant_id: &str) -> SettlementResult<()> {
    if participant_id.is_empty() || participant_id.chars().any(char::is_whitespace) {
        return Err(SettlementError::Validation(format!(
            "Participant ID '{participant_id}' must be non-empty and contain no whitespace"
        )));
    }
    Ok(())
}

/// Display names must be non-blank and short enough for a settlement line
pub fn validate_participant_name(name: &str) -> SettlementResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SettlementError::Validation(
            "Participant name cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > 40 {
        return Err(SettlementError::Validation(format!(
            "Participant name '{trimmed}' is longer than 40 characters"
        )));
    }
    Ok(())
}

/// A contact key is a phone number, optionally formatted
pub fn validate_contact(contact: &str) -> SettlementResult<()> {
    let key = normalize_contact(contact);
    let digits = key.strip_prefix('+').unwrap_or(&key);

    if digits.len() < MIN_CONTACT_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(SettlementError::Validation(format!(
            "Contact '{contact}' is not a phone number of at least {MIN_CONTACT_LEN} digits"
        )));
    }
    Ok(())
}

/// Validate that an expense description is valid
pub fn validate_expense_description(description: &str) -> SettlementResult<()> {
    if description.trim().is_empty() {
        return Err(SettlementError::Validation(
            "Expense description cannot be empty".to_string(),
        ));
    }

    if description.chars().count() > 500 {
        return Err(SettlementError::Validation(
            "Expense description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced expense validator with detailed checks
pub struct EnhancedExpenseValidator;

impl ExpenseValidator for EnhancedExpenseValidator {
    fn validate_expense(&self, expense: &Expense) -> SettlementResult<()> {
        // Basic validation
        DefaultExpenseValidator.validate_expense(expense)?;

        validate_expense_description(&expense.description)?;
        validate_positive_amount(expense.amount)?;

        for id in expense.paid_by.iter().chain(expense.split_between.iter()) {
            validate_participant_id(id)?;
        }

        // A beneficiary listed twice would be charged two shares
        let mut seen = HashSet::new();
        for id in &expense.split_between {
            if !seen.insert(id) {
                return Err(SettlementError::Validation(format!(
                    "Participant '{}' appears multiple times in the split of expense '{}'",
                    id, expense.id
                )));
            }
        }

        if let Some(tag) = &expense.category {
            if tag.trim().is_empty() {
                return Err(SettlementError::Validation(
                    "Expense category cannot be blank".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_participant_references(
        &self,
        expense: &Expense,
        participants: &[Participant],
    ) -> SettlementResult<()> {
        DefaultExpenseValidator.validate_participant_references(expense, participants)
    }
}

/// Enhanced participant validator with detailed checks
pub struct EnhancedParticipantValidator;

impl ParticipantValidator for EnhancedParticipantValidator {
    fn validate_participant(&self, participant: &Participant) -> SettlementResult<()> {
        validate_participant_id(&participant.id)?;
        validate_participant_name(&participant.name)?;

        validate_contact(&participant.contact)
    }
}
