//! Conversion of amounts between the reference, local and secondary currencies

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Convert an amount in any supported currency to the reference currency
pub fn convert(amount: f64, from: Currency, rates: &ConversionRates) -> f64 {
    match from {
        Currency::Reference => amount,
        Currency::Local => amount / rates.reference_to_local,
        Currency::Secondary => amount * rates.secondary_to_local / rates.reference_to_local,
    }
}

/// Convert an amount in the reference currency to the target currency
pub fn from_reference(amount: f64, to: Currency, rates: &ConversionRates) -> f64 {
    match to {
        Currency::Reference => amount,
        Currency::Local => amount * rates.reference_to_local,
        Currency::Secondary => amount * rates.reference_to_local / rates.secondary_to_local,
    }
}

/// Convert an amount in any supported currency to the local currency
pub fn to_local(amount: f64, from: Currency, rates: &ConversionRates) -> f64 {
    match from {
        Currency::Local => amount,
        Currency::Reference => amount * rates.reference_to_local,
        Currency::Secondary => amount * rates.secondary_to_local,
    }
}

/// Convert an amount between any two supported currencies
pub fn convert_between(amount: f64, from: Currency, to: Currency, rates: &ConversionRates) -> f64 {
    if from == to {
        return amount;
    }
    from_reference(convert(amount, from, rates), to, rates)
}

/// One amount expressed in every supported currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionBreakdown {
    pub reference: f64,
    pub local: f64,
    pub secondary: f64,
}

impl ConversionBreakdown {
    /// Express `amount` in all three currencies
    pub fn of(amount: f64, from: Currency, rates: &ConversionRates) -> Self {
        let reference = convert(amount, from, rates);
        Self {
            reference,
            local: to_local(amount, from, rates),
            secondary: from_reference(reference, Currency::Secondary, rates),
        }
    }

    /// The amount in one particular currency
    pub fn in_currency(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Reference => self.reference,
            Currency::Local => self.local,
            Currency::Secondary => self.secondary,
        }
    }
}

/// Converts expenses to the reference currency, falling back to a
/// caller-supplied snapshot for expenses that carry no rates of their own
#[derive(Debug, Clone, Default)]
pub struct CurrencyNormalizer {
    fallback: Option<ConversionRates>,
}

impl CurrencyNormalizer {
    /// Create a normalizer with an optional fallback snapshot
    pub fn new(fallback: Option<ConversionRates>) -> Self {
        Self { fallback }
    }

    /// The fallback snapshot, if any
    pub fn fallback(&self) -> Option<&ConversionRates> {
        self.fallback.as_ref()
    }

    /// Rates for an expense: its snapshot first, then the fallback
    pub fn rates_for(&self, expense: &Expense) -> SettlementResult<ConversionRates> {
        let rates = expense.resolve_rates(self.fallback.as_ref())?;
        rates.validate()?;
        Ok(rates)
    }

    /// The expense total in the reference currency
    ///
    /// Reference-currency expenses need no rates, so they never fail.
    pub fn expense_in_reference(&self, expense: &Expense) -> SettlementResult<f64> {
        if expense.currency == Currency::Reference {
            return Ok(expense.amount);
        }
        let rates = self.rates_for(expense)?;
        Ok(convert(expense.amount, expense.currency, &rates))
    }

    /// The expense total in all three currencies
    pub fn expense_breakdown(&self, expense: &Expense) -> SettlementResult<ConversionBreakdown> {
        let rates = self.rates_for(expense)?;
        Ok(ConversionBreakdown::of(expense.amount, expense.currency, &rates))
    }
}
