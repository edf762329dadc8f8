//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory trip store for testing and embedding
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryTripStore {
    trips: Arc<RwLock<HashMap<String, Trip>>>,
}

fn poisoned<E>(_: E) -> SettlementError {
    SettlementError::Storage("trip store lock poisoned".to_string())
}

impl MemoryTripStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> SettlementResult<()> {
        self.trips.write().map_err(poisoned)?.clear();
        Ok(())
    }

    /// Number of stored trips
    pub fn len(&self) -> SettlementResult<usize> {
        Ok(self.trips.read().map_err(poisoned)?.len())
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn save_trip(&mut self, trip: &Trip) -> SettlementResult<()> {
        self.trips
            .write()
            .map_err(poisoned)?
            .insert(trip.id.clone(), trip.clone());
        Ok(())
    }

    async fn get_trip(&self, trip_id: &str) -> SettlementResult<Option<Trip>> {
        Ok(self.trips.read().map_err(poisoned)?.get(trip_id).cloned())
    }

    async fn list_trips(&self) -> SettlementResult<Vec<Trip>> {
        let trips = self.trips.read().map_err(poisoned)?;
        let mut list: Vec<Trip> = trips.values().cloned().collect();
        list.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn delete_trip(&mut self, trip_id: &str) -> SettlementResult<()> {
        if self.trips.write().map_err(poisoned)?.remove(trip_id).is_some() {
            Ok(())
        } else {
            Err(SettlementError::TripNotFound(trip_id.to_string()))
        }
    }
}
