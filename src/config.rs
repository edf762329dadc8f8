//! Settlement configuration loaded from TOML
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! epsilon = 0.01
//!
//! [default_rates]
//! referenceToLocal = 3.67
//! secondaryToLocal = 3.10
//!
//! [currencies.reference]
//! code = "EUR"
//! symbol = "€"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::currency::CurrencyLabels;
use crate::types::*;

/// Smallest amount, in reference currency, treated as a real balance or debt
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Tunables for the settlement engine and its display helpers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Balances and transfers at or below this magnitude are treated as zero
    pub epsilon: f64,
    /// Rates used when neither the expense nor the caller supplies any
    pub default_rates: ConversionRates,
    /// Codes and symbols for display
    pub currencies: CurrencyLabels,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            default_rates: ConversionRates::static_defaults(),
            currencies: CurrencyLabels::default(),
        }
    }
}

impl SettlementConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> SettlementResult<Self> {
        let config: SettlementConfig = toml::from_str(contents)
            .map_err(|e| SettlementError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> SettlementResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            SettlementError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check that the values can be used for money math
    pub fn validate(&self) -> SettlementResult<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(SettlementError::Config(format!(
                "epsilon must be a positive finite number, got {}",
                self.epsilon
            )));
        }
        self.default_rates
            .validate()
            .map_err(|e| SettlementError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SettlementConfig::from_toml_str("").unwrap();
        assert_eq!(config, SettlementConfig::default());
        assert_eq!(config.epsilon, 0.01);
        assert_eq!(config.default_rates.reference_to_local, 3.67);
    }

    #[test]
    fn test_overrides() {
        let config = SettlementConfig::from_toml_str(
            r#"
            epsilon = 0.005

            [default_rates]
            referenceToLocal = 4.0
            secondaryToLocal = 3.5

            [currencies.reference]
            code = "CHF"
            symbol = "Fr."

            [currencies.local]
            code = "ILS"
            symbol = "₪"

            [currencies.secondary]
            code = "USD"
            symbol = "$"
            "#,
        )
        .unwrap();

        assert_eq!(config.epsilon, 0.005);
        assert_eq!(config.default_rates, ConversionRates::new(4.0, 3.5));
        assert_eq!(config.currencies.reference.symbol, "Fr.");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SettlementConfig::from_toml_str("epsilon = 0.0"),
            Err(SettlementError::Config(_))
        ));
        assert!(matches!(
            SettlementConfig::from_toml_str(
                "[default_rates]\nreferenceToLocal = -1.0\nsecondaryToLocal = 3.1"
            ),
            Err(SettlementError::Config(_))
        ));
        assert!(SettlementConfig::from_toml_str("epsilon = \"x\"").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = SettlementConfig::load("/nonexistent/settlement.toml");
        assert!(matches!(result, Err(SettlementError::Config(_))));
    }
}
