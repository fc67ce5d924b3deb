// Persistence gateway for the lineup order
// Failures never reach the caller: the session keeps its in-memory order.
use tracing::{debug, info, warn};

use super::kv::KeyValueStore;
use crate::roster::models::PlayerId;

pub const DEFAULT_ORDER_KEY: &str = "walkUpPlayerOrder";

pub struct OrderGateway {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl OrderGateway {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, ordered_ids: &[PlayerId]) {
        let encoded = match serde_json::to_string(ordered_ids) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Error encoding player order: {}", e);
                return;
            }
        };
        match self.store.set(&self.key, &encoded) {
            Ok(()) => debug!(key = %self.key, order = %encoded, "Player order saved"),
            Err(e) => warn!(key = %self.key, "Error saving player order, keeping it in memory only: {}", e),
        }
    }

    /// The saved order, or `None` when it is missing, unreadable, malformed, or empty.
    pub fn load(&self) -> Option<Vec<PlayerId>> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(key = %self.key, "No saved player order found");
                return None;
            }
            Err(e) => {
                warn!(key = %self.key, "Error loading player order: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<PlayerId>>(&raw) {
            Ok(ids) if !ids.is_empty() => {
                info!(key = %self.key, count = ids.len(), "Loaded saved player order");
                Some(ids)
            }
            Ok(_) => {
                warn!(key = %self.key, "Saved player order is empty, using default order");
                None
            }
            Err(e) => {
                warn!(key = %self.key, "Saved player order is invalid, using default order: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) {
        match self.store.remove(&self.key) {
            Ok(()) => info!(key = %self.key, "Saved player order cleared"),
            Err(e) => warn!(key = %self.key, "Error clearing player order: {}", e),
        }
    }
}
