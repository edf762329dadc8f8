//! Display formatting for amounts in the supported currencies

use serde::{Deserialize, Serialize};

use crate::currency::normalizer::ConversionBreakdown;
use crate::types::*;

/// Code and symbol of one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyLabel {
    /// ISO code, e.g. `EUR`
    pub code: String,
    /// Symbol printed before amounts, e.g. `€`
    pub symbol: String,
}

impl CurrencyLabel {
    pub fn new(code: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
        }
    }
}

/// Labels for the three supported currencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyLabels {
    pub reference: CurrencyLabel,
    pub local: CurrencyLabel,
    pub secondary: CurrencyLabel,
}

impl Default for CurrencyLabels {
    fn default() -> Self {
        Self {
            reference: CurrencyLabel::new("EUR", "€"),
            local: CurrencyLabel::new("ILS", "₪"),
            secondary: CurrencyLabel::new("USD", "$"),
        }
    }
}

impl CurrencyLabels {
    /// Label of a currency
    pub fn label(&self, currency: Currency) -> &CurrencyLabel {
        match currency {
            Currency::Reference => &self.reference,
            Currency::Local => &self.local,
            Currency::Secondary => &self.secondary,
        }
    }

    /// Symbol of a currency
    pub fn symbol(&self, currency: Currency) -> &str {
        &self.label(currency).symbol
    }
}

/// Insert a comma between every group of three digits
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Symbol and amount rounded to whole units, e.g. `€1,234`
pub fn format_amount(amount: f64, currency: Currency, labels: &CurrencyLabels) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!(
        "{sign}{}{}",
        labels.symbol(currency),
        group_thousands(&digits)
    )
}

/// Symbol and amount with two decimals, e.g. `€1,234.50`
pub fn format_cents(amount: f64, currency: Currency, labels: &CurrencyLabels) -> String {
    let sign = if amount < -0.005 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!(
        "{sign}{}{}.{fraction}",
        labels.symbol(currency),
        group_thousands(whole)
    )
}

/// The amount in the other two currencies, joined by ` · `
pub fn format_conversion(
    amount: f64,
    from: Currency,
    rates: &ConversionRates,
    labels: &CurrencyLabels,
) -> String {
    let breakdown = ConversionBreakdown::of(amount, from, rates);
    Currency::ALL
        .into_iter()
        .filter(|c| *c != from)
        .map(|c| format_amount(breakdown.in_currency(c), c, labels))
        .collect::<Vec<_>>()
        .join(" · ")
}

/// The amount in its counterpart currency: local for reference amounts,
/// reference for everything else
pub fn format_counterpart(
    amount: f64,
    from: Currency,
    rates: &ConversionRates,
    labels: &CurrencyLabels,
) -> String {
    let breakdown = ConversionBreakdown::of(amount, from, rates);
    match from {
        Currency::Reference => format_amount(breakdown.local, Currency::Local, labels),
        _ => format_amount(breakdown.reference, Currency::Reference, labels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_groups_thousands() {
        let labels = CurrencyLabels::default();
        assert_eq!(format_amount(1234.4, Currency::Reference, &labels), "€1,234");
        assert_eq!(format_amount(999.5, Currency::Local, &labels), "₪1,000");
        assert_eq!(format_amount(12.0, Currency::Secondary, &labels), "$12");
        assert_eq!(
            format_amount(-1234567.0, Currency::Reference, &labels),
            "-€1,234,567"
        );
    }

    #[test]
    fn test_format_cents() {
        let labels = CurrencyLabels::default();
        assert_eq!(format_cents(1234.5, Currency::Reference, &labels), "€1,234.50");
        assert_eq!(format_cents(0.004, Currency::Reference, &labels), "€0.00");
        assert_eq!(format_cents(-40.0, Currency::Reference, &labels), "-€40.00");
    }

    #[test]
    fn test_format_conversion_skips_source_currency() {
        let labels = CurrencyLabels::default();
        let rates = ConversionRates::new(4.0, 2.0);
        assert_eq!(
            format_conversion(100.0, Currency::Reference, &rates, &labels),
            "₪400 · $200"
        );
        assert_eq!(
            format_conversion(400.0, Currency::Local, &rates, &labels),
            "€100 · $200"
        );
    }

    #[test]
    fn test_format_counterpart() {
        let labels = CurrencyLabels::default();
        let rates = ConversionRates::new(4.0, 2.0);
        assert_eq!(
            format_counterpart(100.0, Currency::Reference, &rates, &labels),
            "₪400"
        );
        assert_eq!(
            format_counterpart(100.0, Currency::Secondary, &rates, &labels),
            "€50"
        );
    }
}
