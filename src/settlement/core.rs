//! Settlement engine that turns expenses into balances and transfers

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SettlementConfig;
use crate::currency::CurrencyNormalizer;
use crate::settlement::balances::{aggregate_balances, Balances, SkippedExpense};
use crate::settlement::debts::minimize_debts;
use crate::types::*;

/// Balances, transfers and skipped expenses from one settlement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub balances: Balances,
    pub debts: Vec<Debt>,
    pub skipped: Vec<SkippedExpense>,
}

impl SettlementReport {
    /// Sum of all transfer amounts
    pub fn total_transferred(&self) -> f64 {
        self.debts.iter().map(|d| d.amount).sum()
    }

    /// Transfers a participant has to make
    pub fn debts_from<'a>(&'a self, participant_id: &'a str) -> impl Iterator<Item = &'a Debt> {
        self.debts.iter().filter(move |d| d.from == participant_id)
    }

    /// Transfers a participant will receive
    pub fn debts_to<'a>(&'a self, participant_id: &'a str) -> impl Iterator<Item = &'a Debt> {
        self.debts.iter().filter(move |d| d.to == participant_id)
    }

    /// Whether nobody owes anybody
    pub fn is_settled(&self) -> bool {
        self.debts.is_empty()
    }
}

/// Stateless settlement engine
///
/// Every call recomputes from the given snapshot, so identical inputs always
/// produce identical output and the engine can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    config: SettlementConfig,
}

impl SettlementEngine {
    /// Create an engine with the given configuration
    pub fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    /// Engine configuration
    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Net balance per participant in reference currency
    pub fn compute_balances(
        &self,
        expenses: &[Expense],
        participants: &[Participant],
        fallback: Option<&ConversionRates>,
    ) -> SettlementResult<Balances> {
        let normalizer = CurrencyNormalizer::new(fallback.copied());
        Ok(aggregate_balances(expenses, participants, &normalizer)?.balances)
    }

    /// Ordered transfers that settle every balance
    pub fn compute_debts(
        &self,
        expenses: &[Expense],
        participants: &[Participant],
        fallback: Option<&ConversionRates>,
    ) -> SettlementResult<Vec<Debt>> {
        let balances = self.compute_balances(expenses, participants, fallback)?;
        Ok(minimize_debts(&balances, self.config.epsilon))
    }

    /// Full settlement run, including the expenses that were skipped
    pub fn settle(
        &self,
        expenses: &[Expense],
        participants: &[Participant],
        fallback: Option<&ConversionRates>,
    ) -> SettlementResult<SettlementReport> {
        let normalizer = CurrencyNormalizer::new(fallback.copied());
        let sheet = aggregate_balances(expenses, participants, &normalizer)?;
        let debts = minimize_debts(&sheet.balances, self.config.epsilon);

        info!(
            expenses = expenses.len(),
            participants = participants.len(),
            skipped = sheet.skipped.len(),
            transfers = debts.len(),
            "Settlement computed"
        );

        Ok(SettlementReport {
            balances: sheet.balances,
            debts,
            skipped: sheet.skipped,
        })
    }

    /// Settle a whole trip record
    pub fn settle_trip(
        &self,
        trip: &Trip,
        fallback: Option<&ConversionRates>,
    ) -> SettlementResult<SettlementReport> {
        self.settle(&trip.expenses, &trip.participants, fallback)
    }
}

/// Net balance per participant using the default configuration
pub fn compute_balances(
    expenses: &[Expense],
    participants: &[Participant],
    fallback: Option<&ConversionRates>,
) -> SettlementResult<Balances> {
    SettlementEngine::default().compute_balances(expenses, participants, fallback)
}

/// Settling transfers using the default configuration
pub fn compute_debts(
    expenses: &[Expense],
    participants: &[Participant],
    fallback: Option<&ConversionRates>,
) -> SettlementResult<Vec<Debt>> {
    SettlementEngine::default().compute_debts(expenses, participants, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn participants() -> Vec<Participant> {
        vec![
            Participant::new("p1", "Dana", "+972500000001"),
            Participant::new("p2", "Noa", "+972500000002"),
            Participant::new("p3", "Yoni", "+972500000003"),
        ]
    }

    fn expense(id: &str, amount: f64, payer: &str, split: &[&str]) -> Expense {
        Expense {
            id: id.to_string(),
            description: "Dinner".to_string(),
            amount,
            currency: Currency::Reference,
            paid_by: Payers::single(payer),
            split_between: split.iter().map(|s| s.to_string()).collect(),
            date: Utc::now(),
            category: None,
            excluded_from_settlement: false,
            rates: None,
        }
    }

    #[test]
    fn test_settle_reports_everything() {
        let engine = SettlementEngine::default();
        let expenses = vec![
            expense("e1", 90.0, "p1", &["p1", "p2", "p3"]),
            expense("e2", 30.0, "p2", &["p1", "p2", "p3"]),
            expense("e3", 10.0, "p3", &[]),
        ];

        let report = engine.settle(&expenses, &participants(), None).unwrap();

        assert_eq!(
            report.debts,
            vec![
                Debt {
                    from: "p3".to_string(),
                    to: "p1".to_string(),
                    amount: 40.0,
                },
                Debt {
                    from: "p2".to_string(),
                    to: "p1".to_string(),
                    amount: 10.0,
                },
            ]
        );
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].expense_id, "e3");
        assert!((report.total_transferred() - 50.0).abs() < 1e-9);
        assert_eq!(report.debts_to("p1").count(), 2);
        assert_eq!(report.debts_from("p3").count(), 1);
        assert!(!report.is_settled());
    }

    #[test]
    fn test_custom_epsilon() {
        let engine = SettlementEngine::new(SettlementConfig {
            epsilon: 5.0,
            ..SettlementConfig::default()
        });
        let expenses = vec![expense("e1", 6.0, "p1", &["p1", "p2", "p3"])];
        let debts = engine.compute_debts(&expenses, &participants(), None).unwrap();
        assert!(debts.is_empty());
    }

    #[test]
    fn test_free_functions_match_engine() {
        let expenses = vec![expense("e1", 100.0, "p1", &["p1", "p2"])];
        let roster = participants();
        let debts = compute_debts(&expenses, &roster, None).unwrap();
        let balances = compute_balances(&expenses, &roster, None).unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(balances.get("p3"), Some(0.0));
    }
}
