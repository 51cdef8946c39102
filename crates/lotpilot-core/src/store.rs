//! Injected context storage.
//!
//! Flows consume context as JSON blobs; something has to own the underlying
//! records. `ContextStore` is that seam: the in-memory implementation backs
//! the CLI and tests, and a persistent store can slot in behind the same
//! trait without touching any flow.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{Bookmark, NearbyLot};
use crate::CoreError;

/// Read/write access to assistant context entities.
pub trait ContextStore: Send + Sync {
    fn bookmarks_for(&self, user_id: &str) -> Vec<Bookmark>;
    fn put_bookmark(&self, user_id: &str, bookmark: Bookmark);
    fn nearby_lots(&self) -> Vec<NearbyLot>;
    fn put_lot(&self, lot: NearbyLot);
}

/// In-memory store keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    bookmarks: Mutex<HashMap<String, Vec<Bookmark>>>,
    lots: Mutex<Vec<NearbyLot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with demo data for the CLI and examples.
    pub fn seeded() -> Self {
        let store = Self::new();

        store.put_bookmark(
            "user_abc123",
            Bookmark::new("bm_1", "Home")
                .with_address("10 Residential St, Anytown")
                .with_coordinates(34.0600, -118.2300),
        );
        store.put_bookmark(
            "user_abc123",
            Bookmark::new("bm_2", "Work")
                .with_address("1 Business Ave, Anytown")
                .with_coordinates(34.0510, -118.2450),
        );

        store.put_lot(
            NearbyLot::new("lot_A", "Downtown Garage")
                .with_availability(12)
                .with_price_per_hour(2.50)
                .with_services(vec![String::from("EV Charging"), String::from("Car Wash")]),
        );
        store.put_lot(
            NearbyLot::new("lot_B", "Airport Lot")
                .with_availability(48)
                .with_price_per_hour(4.00)
                .with_services(vec![String::from("Shuttle")]),
        );
        store.put_lot(
            NearbyLot::new("lot_C", "Mall Parking")
                .with_availability(3)
                .with_price_per_hour(1.50),
        );

        store
    }
}

impl ContextStore for InMemoryStore {
    fn bookmarks_for(&self, user_id: &str) -> Vec<Bookmark> {
        self.bookmarks
            .lock()
            .expect("bookmark store lock is not poisoned")
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn put_bookmark(&self, user_id: &str, bookmark: Bookmark) {
        self.bookmarks
            .lock()
            .expect("bookmark store lock is not poisoned")
            .entry(user_id.to_owned())
            .or_default()
            .push(bookmark);
    }

    fn nearby_lots(&self) -> Vec<NearbyLot> {
        self.lots
            .lock()
            .expect("lot store lock is not poisoned")
            .clone()
    }

    fn put_lot(&self, lot: NearbyLot) {
        self.lots
            .lock()
            .expect("lot store lock is not poisoned")
            .push(lot);
    }
}

/// Serialize store records into the JSON blob format flows expect.
pub fn to_context_json<T: serde::Serialize>(items: &[T]) -> Result<String, CoreError> {
    Ok(serde_json::to_string(items)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookmarks_are_scoped_per_user() {
        let store = InMemoryStore::new();
        store.put_bookmark("user_a", Bookmark::new("bm_1", "Home"));

        assert_eq!(store.bookmarks_for("user_a").len(), 1);
        assert!(store.bookmarks_for("user_b").is_empty());
    }

    #[test]
    fn seeded_store_round_trips_through_context_json() {
        let store = InMemoryStore::seeded();
        let lots = store.nearby_lots();
        let json = to_context_json(&lots).expect("must serialize");

        let parsed = crate::context::nearby_lots_from_json(Some(&json));
        assert_eq!(parsed.items.len(), lots.len());
        assert!(parsed.warnings.is_empty());
    }
}
