//! Expense construction and common expense patterns

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Parameters for recording a trip fixed cost
#[derive(Debug, Clone, PartialEq)]
pub struct FixedCostParams {
    /// Which fixed cost this is
    pub kind: FixedCostKind,
    /// Payer of a shared cost (defaults to the first participant) or owner
    /// of a personal one
    pub participant_id: Option<ParticipantId>,
    pub amount: f64,
    pub currency: Currency,
    /// Rates at the time the cost is recorded
    pub rates: ConversionRates,
}

/// Builder for expenses
#[derive(Debug)]
pub struct ExpenseBuilder {
    expense: Expense,
}

impl ExpenseBuilder {
    /// Start an expense with a fresh id and the current time
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        currency: Currency,
        paid_by: Payers,
    ) -> Self {
        Self {
            expense: Expense {
                id: Uuid::new_v4().to_string(),
                description: description.into(),
                amount,
                currency,
                paid_by,
                split_between: Vec::new(),
                date: Utc::now(),
                category: None,
                excluded_from_settlement: false,
                rates: None,
            },
        }
    }

    /// Use a specific id instead of a generated one
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.expense.id = id.into();
        self
    }

    /// Set the timestamp
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.expense.date = date;
        self
    }

    /// Replace the beneficiaries
    pub fn split_between<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ParticipantId>,
    {
        self.expense.split_between = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Add one beneficiary
    pub fn beneficiary(mut self, id: impl Into<ParticipantId>) -> Self {
        self.expense.split_between.push(id.into());
        self
    }

    /// Tag the expense with a category
    pub fn category(mut self, tag: impl Into<String>) -> Self {
        self.expense.category = Some(tag.into());
        self
    }

    /// Keep the expense out of peer debts
    pub fn excluded_from_settlement(mut self, excluded: bool) -> Self {
        self.expense.excluded_from_settlement = excluded;
        self
    }

    /// Capture a rate snapshot
    pub fn rates(mut self, rates: ConversionRates) -> Self {
        self.expense.rates = Some(rates.into());
        self
    }

    /// Build the expense
    pub fn build(self) -> SettlementResult<Expense> {
        DefaultExpenseValidator.validate_expense(&self.expense)?;
        Ok(self.expense)
    }
}

/// Common expense patterns
pub mod patterns {
    use super::*;

    /// An everyday purchase split between some participants
    pub fn purchase(
        description: impl Into<String>,
        amount: f64,
        currency: Currency,
        paid_by: Payers,
        split_between: Vec<ParticipantId>,
        rates: ConversionRates,
    ) -> SettlementResult<Expense> {
        ExpenseBuilder::new(description, amount, currency, paid_by)
            .split_between(split_between)
            .rates(rates)
            .build()
    }

    /// A shared fixed cost split across the whole roster
    ///
    /// Kinds paid collectively upfront, such as lodging, are flagged as
    /// excluded from settlement.
    pub fn shared_fixed_cost(
        kind: FixedCostKind,
        payer: ParticipantId,
        participants: &[Participant],
        amount: f64,
        currency: Currency,
        rates: ConversionRates,
    ) -> SettlementResult<Expense> {
        ExpenseBuilder::new(kind.label(), amount, currency, Payers::single(payer))
            .split_between(participants.iter().map(|p| p.id.clone()))
            .category(kind.tag())
            .excluded_from_settlement(kind.excluded_from_settlement())
            .rates(rates)
            .build()
    }

    /// A personal fixed cost, paid by and charged to one participant
    pub fn personal_fixed_cost(
        kind: FixedCostKind,
        participant_id: ParticipantId,
        amount: f64,
        currency: Currency,
        rates: ConversionRates,
    ) -> SettlementResult<Expense> {
        ExpenseBuilder::new(
            kind.label(),
            amount,
            currency,
            Payers::single(participant_id.clone()),
        )
        .beneficiary(participant_id)
        .category(kind.tag())
        .excluded_from_settlement(kind.excluded_from_settlement())
        .rates(rates)
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("p1", "Dana", "+972500000001"),
            Participant::new("p2", "Noa", "+972500000002"),
        ]
    }

    #[test]
    fn test_builder_generates_unique_ids() {
        let a = ExpenseBuilder::new("Coffee", 4.5, Currency::Reference, Payers::single("p1"))
            .beneficiary("p1")
            .build()
            .unwrap();
        let b = ExpenseBuilder::new("Coffee", 4.5, Currency::Reference, Payers::single("p1"))
            .beneficiary("p1")
            .build()
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_builder_validates() {
        let no_split =
            ExpenseBuilder::new("Coffee", 4.5, Currency::Reference, Payers::single("p1")).build();
        assert!(no_split.is_err());

        let negative =
            ExpenseBuilder::new("Coffee", -1.0, Currency::Reference, Payers::single("p1"))
                .beneficiary("p1")
                .build();
        assert!(negative.is_err());

        let blank = ExpenseBuilder::new("  ", 1.0, Currency::Reference, Payers::single("p1"))
            .beneficiary("p1")
            .build();
        assert!(blank.is_err());
    }

    #[test]
    fn test_shared_apartment_excluded() {
        let expense = patterns::shared_fixed_cost(
            FixedCostKind::Apartment,
            "p1".to_string(),
            &roster(),
            1200.0,
            Currency::Reference,
            ConversionRates::static_defaults(),
        )
        .unwrap();

        assert!(expense.excluded_from_settlement);
        assert_eq!(expense.split_between, vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(expense.fixed_cost_kind(), Some(FixedCostKind::Apartment));
        assert_eq!(expense.description, "Apartment");
    }

    #[test]
    fn test_personal_fixed_cost() {
        let expense = patterns::personal_fixed_cost(
            FixedCostKind::SkiPass,
            "p2".to_string(),
            300.0,
            Currency::Reference,
            ConversionRates::static_defaults(),
        )
        .unwrap();

        assert!(!expense.excluded_from_settlement);
        assert!(expense.is_paid_by("p2"));
        assert_eq!(expense.split_between, vec!["p2".to_string()]);
        assert_eq!(expense.category.as_deref(), Some("skipass"));
    }

    #[test]
    fn test_purchase_captures_rates() {
        let rates = ConversionRates::new(3.9, 3.6);
        let expense = patterns::purchase(
            "Groceries",
            250.0,
            Currency::Local,
            Payers::new(["p1", "p2"]).unwrap(),
            vec!["p1".to_string(), "p2".to_string()],
            rates,
        )
        .unwrap();
        assert_eq!(expense.rates, Some(rates.into()));
        assert_eq!(expense.paid_by.len(), 2);
    }
}
