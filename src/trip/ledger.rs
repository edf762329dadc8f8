//! Trip ledger that ties storage, commands and settlement together

use tracing::info;

use crate::config::SettlementConfig;
use crate::settlement::{Balances, SettlementEngine, SettlementReport};
use crate::traits::*;
use crate::trip::commands::{TripCommand, TripReducer};
use crate::trip::summary::TripSummary;
use crate::types::*;

/// Main entry point for hosts that keep trips in a [`TripStore`]
///
/// Mutations load the stored trip, run the command through the reducer and
/// save the whole document back. Concurrent writers follow last-write-wins.
/// Settlement calls fall back to the configured default rates when the
/// caller passes none.
pub struct TripLedger<S: TripStore> {
    store: S,
    reducer: TripReducer,
    engine: SettlementEngine,
}

impl<S: TripStore> TripLedger<S> {
    /// Create a ledger with the default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, SettlementConfig::default())
    }

    /// Create a ledger with a custom configuration
    pub fn with_config(store: S, config: SettlementConfig) -> Self {
        Self {
            store,
            reducer: TripReducer::new(),
            engine: SettlementEngine::new(config),
        }
    }

    /// Replace the command reducer, e.g. to use stricter validators
    pub fn with_reducer(mut self, reducer: TripReducer) -> Self {
        self.reducer = reducer;
        self
    }

    /// The settlement configuration in use
    pub fn config(&self) -> &SettlementConfig {
        self.engine.config()
    }

    /// Store a new trip
    pub async fn create_trip(&mut self, trip: Trip) -> SettlementResult<Trip> {
        if trip.end_date < trip.start_date {
            return Err(SettlementError::Validation(format!(
                "Trip '{}' ends before it starts",
                trip.id
            )));
        }
        if self.store.get_trip(&trip.id).await?.is_some() {
            return Err(SettlementError::Validation(format!(
                "Trip with ID '{}' already exists",
                trip.id
            )));
        }

        self.store.save_trip(&trip).await?;
        info!(trip_id = %trip.id, "Trip created");
        Ok(trip)
    }

    /// Get a trip by ID
    pub async fn get_trip(&self, trip_id: &str) -> SettlementResult<Option<Trip>> {
        self.store.get_trip(trip_id).await
    }

    /// Get a trip by ID, failing when it does not exist
    pub async fn get_trip_required(&self, trip_id: &str) -> SettlementResult<Trip> {
        self.store
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| SettlementError::TripNotFound(trip_id.to_string()))
    }

    /// List all trips
    pub async fn list_trips(&self) -> SettlementResult<Vec<Trip>> {
        self.store.list_trips().await
    }

    /// Delete a trip
    pub async fn delete_trip(&mut self, trip_id: &str) -> SettlementResult<()> {
        self.store.delete_trip(trip_id).await?;
        info!(trip_id = %trip_id, "Trip deleted");
        Ok(())
    }

    /// Apply a command to a stored trip and save the result
    pub async fn apply(&mut self, trip_id: &str, command: TripCommand) -> SettlementResult<Trip> {
        let current = self.get_trip_required(trip_id).await?;
        let next = self.reducer.apply(&current, command)?;
        self.store.save_trip(&next).await?;
        Ok(next)
    }

    /// Net balance per participant of a stored trip
    pub async fn balances(
        &self,
        trip_id: &str,
        fallback: Option<&ConversionRates>,
    ) -> SettlementResult<Balances> {
        Ok(self.settle(trip_id, fallback).await?.balances)
    }

    /// Settling transfers for a stored trip
    pub async fn debts(
        &self,
        trip_id: &str,
        fallback: Option<&ConversionRates>,
    ) -> SettlementResult<Vec<Debt>> {
        Ok(self.settle(trip_id, fallback).await?.debts)
    }

    /// Full settlement report for a stored trip
    pub async fn settle(
        &self,
        trip_id: &str,
        fallback: Option<&ConversionRates>,
    ) -> SettlementResult<SettlementReport> {
        let trip = self.get_trip_required(trip_id).await?;
        let rates = fallback.unwrap_or(&self.engine.config().default_rates);
        self.engine.settle_trip(&trip, Some(rates))
    }

    /// Totals for a stored trip
    pub async fn summary(
        &self,
        trip_id: &str,
        live_rates: Option<&ConversionRates>,
    ) -> SettlementResult<TripSummary> {
        let trip = self.get_trip_required(trip_id).await?;
        let rates = live_rates.unwrap_or(&self.engine.config().default_rates);
        TripSummary::compute(&trip, rates)
    }
}
