//! Core types and data structures for trip expense settlement

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a trip participant, unique within a trip
pub type ParticipantId = String;

/// Default number of local units per reference unit
pub const DEFAULT_REFERENCE_TO_LOCAL: f64 = 3.67;

/// Default number of local units per secondary unit
pub const DEFAULT_SECONDARY_TO_LOCAL: f64 = 3.10;

/// A person taking part in a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique identifier within the trip
    pub id: ParticipantId,
    /// Display name
    pub name: String,
    /// Contact key used to recognise the participant across sessions
    #[serde(alias = "phone")]
    pub contact: String,
}

impl Participant {
    /// Create a new participant
    pub fn new(id: impl Into<String>, name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact: contact.into(),
        }
    }
}

/// Canonical form of a contact key: spaces, dashes and parentheses removed
pub fn normalize_contact(contact: &str) -> String {
    contact
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

/// Currencies an expense can be recorded in
///
/// All settlement math happens in the reference currency. The local currency
/// is the one rates are quoted against, and the secondary currency is priced
/// against the reference through the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Reference currency, the unit of every balance and debt
    #[serde(alias = "EUR")]
    Reference,
    /// Local currency, the quote currency of both rates
    #[serde(alias = "ILS")]
    Local,
    /// Secondary currency
    #[serde(alias = "USD")]
    Secondary,
}

impl Currency {
    /// All currencies in display order
    pub const ALL: [Currency; 3] = [Currency::Reference, Currency::Local, Currency::Secondary];

    /// Currency assumed for expense records that do not carry one
    pub fn unspecified() -> Self {
        Currency::Local
    }

    /// Next currency in display order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Currency::Reference => Currency::Local,
            Currency::Local => Currency::Secondary,
            Currency::Secondary => Currency::Reference,
        }
    }
}

/// Snapshot of market rates, both quoted in local currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRates {
    /// Local units per one reference unit
    pub reference_to_local: f64,
    /// Local units per one secondary unit
    pub secondary_to_local: f64,
}

impl ConversionRates {
    /// Create a new rate snapshot
    pub fn new(reference_to_local: f64, secondary_to_local: f64) -> Self {
        Self {
            reference_to_local,
            secondary_to_local,
        }
    }

    /// Static rates used when no live source is available
    pub fn static_defaults() -> Self {
        Self::new(DEFAULT_REFERENCE_TO_LOCAL, DEFAULT_SECONDARY_TO_LOCAL)
    }

    /// Reference units per one secondary unit
    pub fn secondary_to_reference(&self) -> f64 {
        self.secondary_to_local / self.reference_to_local
    }

    /// Both rates must be finite and strictly positive
    pub fn validate(&self) -> SettlementResult<()> {
        for (name, rate) in [
            ("reference_to_local", self.reference_to_local),
            ("secondary_to_local", self.secondary_to_local),
        ] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(SettlementError::InvalidRates(format!(
                    "{name} must be a positive finite number, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Non-empty ordered set of participants who paid for an expense
///
/// Trip documents store a single payer as a bare string and several payers
/// as an array; both forms deserialize into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Payers(Vec<ParticipantId>);

impl Payers {
    /// Build a payer set, dropping repeated ids while keeping first-seen order
    pub fn new<I, T>(ids: I) -> SettlementResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<ParticipantId>,
    {
        let mut unique: Vec<ParticipantId> = Vec::new();
        for id in ids {
            let id = id.into();
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        if unique.is_empty() {
            return Err(SettlementError::Validation(
                "An expense needs at least one payer".to_string(),
            ));
        }

        Ok(Self(unique))
    }

    /// A single payer
    pub fn single(id: impl Into<ParticipantId>) -> Self {
        Self(vec![id.into()])
    }

    /// Number of payers, never zero
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no payers
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the participant is one of the payers
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|p| p == id)
    }

    /// Iterate payer ids in order
    pub fn iter(&self) -> std::slice::Iter<'_, ParticipantId> {
        self.0.iter()
    }

    /// Payer ids as a slice
    pub fn as_slice(&self) -> &[ParticipantId] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Payers {
    type Item = &'a ParticipantId;
    type IntoIter = std::slice::Iter<'a, ParticipantId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Payers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPayers {
            One(String),
            Many(Vec<String>),
        }

        let ids = match RawPayers::deserialize(deserializer)? {
            RawPayers::One(id) => vec![id],
            RawPayers::Many(ids) => ids,
        };
        Payers::new(ids).map_err(serde::de::Error::custom)
    }
}

/// Rates captured on an expense, either of which may be absent
///
/// A missing rate is taken from the caller's fallback when the expense is
/// converted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_to_local: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_to_local: Option<f64>,
}

impl RateSnapshot {
    /// Whether neither rate was captured
    pub fn is_empty(&self) -> bool {
        self.reference_to_local.is_none() && self.secondary_to_local.is_none()
    }

    /// Fill rates missing here from `other`
    pub fn or(self, other: RateSnapshot) -> Self {
        Self {
            reference_to_local: self.reference_to_local.or(other.reference_to_local),
            secondary_to_local: self.secondary_to_local.or(other.secondary_to_local),
        }
    }

    /// Complete rates, taking each missing one from the fallback
    pub fn resolve(&self, fallback: Option<&ConversionRates>) -> Option<ConversionRates> {
        let fallback = fallback.copied().map(RateSnapshot::from).unwrap_or_default();
        let merged = self.or(fallback);
        Some(ConversionRates::new(
            merged.reference_to_local?,
            merged.secondary_to_local?,
        ))
    }
}

impl From<ConversionRates> for RateSnapshot {
    fn from(rates: ConversionRates) -> Self {
        Self {
            reference_to_local: Some(rates.reference_to_local),
            secondary_to_local: Some(rates.secondary_to_local),
        }
    }
}

/// A purchase made by one or more participants on behalf of others
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ExpenseDocument")]
pub struct Expense {
    /// Unique identifier for the expense
    pub id: String,
    /// What was bought
    pub description: String,
    /// Amount in `currency`, expected to be positive
    pub amount: f64,
    /// Currency the amount was paid in
    pub currency: Currency,
    /// Who paid; the amount is credited equally among them
    pub paid_by: Payers,
    /// Who benefits; the amount is debited equally among them
    pub split_between: Vec<ParticipantId>,
    /// When the expense was recorded
    pub date: DateTime<Utc>,
    /// Optional category tag, fixed costs use their kind's tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Paid collectively upfront and kept out of peer debts
    pub excluded_from_settlement: bool,
    /// Rates captured when the expense was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rates: Option<RateSnapshot>,
}

/// Expense as stored in trip documents
///
/// Older documents carry the rates as flat `rateEurIls` / `rateUsdIls`
/// fields, name fixed costs in `fixedType` and have no exclusion flag.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseDocument {
    id: String,
    description: String,
    amount: f64,
    #[serde(default = "Currency::unspecified")]
    currency: Currency,
    paid_by: Payers,
    split_between: Vec<ParticipantId>,
    date: DateTime<Utc>,
    #[serde(default, alias = "fixedType")]
    category: Option<String>,
    #[serde(default)]
    excluded_from_settlement: Option<bool>,
    #[serde(default)]
    rates: Option<RateSnapshot>,
    #[serde(default, rename = "rateEurIls")]
    flat_reference_to_local: Option<f64>,
    #[serde(default, rename = "rateUsdIls")]
    flat_secondary_to_local: Option<f64>,
}

impl From<ExpenseDocument> for Expense {
    fn from(doc: ExpenseDocument) -> Self {
        let flat = RateSnapshot {
            reference_to_local: doc.flat_reference_to_local,
            secondary_to_local: doc.flat_secondary_to_local,
        };
        let rates = doc.rates.unwrap_or_default().or(flat);

        // without an explicit flag, the fixed-cost kind decides
        let excluded_from_settlement = doc.excluded_from_settlement.unwrap_or_else(|| {
            doc.category
                .as_deref()
                .and_then(FixedCostKind::from_tag)
                .is_some_and(|kind| kind.excluded_from_settlement())
        });

        Self {
            id: doc.id,
            description: doc.description,
            amount: doc.amount,
            currency: doc.currency,
            paid_by: doc.paid_by,
            split_between: doc.split_between,
            date: doc.date,
            category: doc.category,
            excluded_from_settlement,
            rates: (!rates.is_empty()).then_some(rates),
        }
    }
}

impl Expense {
    /// Rates to convert this expense with, each taken from its own
    /// snapshot when captured and from the fallback otherwise
    pub fn resolve_rates(
        &self,
        fallback: Option<&ConversionRates>,
    ) -> SettlementResult<ConversionRates> {
        self.rates
            .unwrap_or_default()
            .resolve(fallback)
            .ok_or_else(|| SettlementError::MissingRates {
                expense_id: self.id.clone(),
            })
    }

    /// Whether the participant is among the payers
    pub fn is_paid_by(&self, participant_id: &str) -> bool {
        self.paid_by.contains(participant_id)
    }

    /// Whether the participant is among the beneficiaries
    pub fn is_split_with(&self, participant_id: &str) -> bool {
        self.split_between.iter().any(|p| p == participant_id)
    }

    /// Fixed-cost kind encoded in the category tag, if any
    pub fn fixed_cost_kind(&self) -> Option<FixedCostKind> {
        self.category.as_deref().and_then(FixedCostKind::from_tag)
    }
}

/// Trip-wide fixed costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedCostKind {
    /// Lodging, pre-paid by the group
    Apartment,
    /// Flight tickets
    Tickets,
    /// Travel insurance
    Insurance,
    /// Airport transfer
    Transfer,
    /// Ski pass
    SkiPass,
    /// Equipment rental
    Rental,
    /// Mobile data plan
    ESim,
}

impl FixedCostKind {
    /// Every kind in catalog order
    pub const ALL: [FixedCostKind; 7] = [
        FixedCostKind::Apartment,
        FixedCostKind::Tickets,
        FixedCostKind::Insurance,
        FixedCostKind::Transfer,
        FixedCostKind::SkiPass,
        FixedCostKind::Rental,
        FixedCostKind::ESim,
    ];

    /// Category tag stored on expenses of this kind
    pub fn tag(&self) -> &'static str {
        match self {
            FixedCostKind::Apartment => "apartment",
            FixedCostKind::Tickets => "tickets",
            FixedCostKind::Insurance => "insurance",
            FixedCostKind::Transfer => "transfer",
            FixedCostKind::SkiPass => "skipass",
            FixedCostKind::Rental => "rental",
            FixedCostKind::ESim => "esim",
        }
    }

    /// Parse a category tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Default description for expenses of this kind
    pub fn label(&self) -> &'static str {
        match self {
            FixedCostKind::Apartment => "Apartment",
            FixedCostKind::Tickets => "Flight tickets",
            FixedCostKind::Insurance => "Insurance",
            FixedCostKind::Transfer => "Transfer",
            FixedCostKind::SkiPass => "Ski pass",
            FixedCostKind::Rental => "Equipment rental",
            FixedCostKind::ESim => "e-SIM",
        }
    }

    /// Shared kinds are split across the whole roster; the rest are personal
    pub fn is_shared(&self) -> bool {
        matches!(self, FixedCostKind::Apartment)
    }

    /// Whether expenses of this kind are kept out of peer debts by default
    pub fn excluded_from_settlement(&self) -> bool {
        matches!(self, FixedCostKind::Apartment)
    }
}

/// A settling transfer between two participants, in reference currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// Participant who owes
    pub from: ParticipantId,
    /// Participant who is owed
    pub to: ParticipantId,
    /// Amount rounded to cents
    pub amount: f64,
}

/// A trip record, replaced as a whole on every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Unique identifier for the trip
    pub id: String,
    /// Trip name
    pub name: String,
    /// First day of the trip
    pub start_date: NaiveDate,
    /// Last day of the trip
    pub end_date: NaiveDate,
    /// Roster, in joining order
    #[serde(alias = "people")]
    pub participants: Vec<Participant>,
    /// Recorded expenses, in insertion order
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Trip {
    /// Create an empty trip
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            participants: Vec::new(),
            expenses: Vec::new(),
        }
    }

    /// Look up a participant by id
    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    /// Look up a participant by contact key, ignoring formatting
    pub fn participant_by_contact(&self, contact: &str) -> Option<&Participant> {
        let key = normalize_contact(contact);
        self.participants
            .iter()
            .find(|p| normalize_contact(&p.contact) == key)
    }

    /// Look up an expense by id
    pub fn expense(&self, expense_id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == expense_id)
    }

    /// Ids of every participant, in roster order
    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }
}

/// Errors that can occur while settling trip expenses
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("No conversion rates for expense {expense_id} and no fallback supplied")]
    MissingRates { expense_id: String },
    #[error("Invalid conversion rates: {0}")]
    InvalidRates(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),
    #[error("Trip not found: {0}")]
    TripNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for settlement operations
pub type SettlementResult<T> = Result<T, SettlementError>;
