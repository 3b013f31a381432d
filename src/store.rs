//! Per-node store of the currently active shard values
//!
//! The store holds one immutable [`FlagShards`] snapshot behind an `Arc`.
//! A write swaps the whole snapshot, so readers always see the three
//! values of a single ingestion and never a mix of old and new.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Placeholder reported before the first ingestion
pub const PLACEHOLDER: &str = "None";

/// The three shard values held by one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagShards {
    /// Shard sealed inside the encrypted archive
    pub zip: String,

    /// Shard embedded in the HTML page
    pub web: String,

    /// Shard returned to command-line clients
    pub curl: String,
}

impl Default for FlagShards {
    fn default() -> Self {
        Self {
            zip: PLACEHOLDER.to_string(),
            web: PLACEHOLDER.to_string(),
            curl: PLACEHOLDER.to_string(),
        }
    }
}

/// Shared, snapshot-swapping holder of [`FlagShards`]
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: RwLock<Arc<FlagShards>>,
}

impl ConfigStore {
    /// Create a store holding placeholder values
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub async fn read(&self) -> Arc<FlagShards> {
        self.current.read().await.clone()
    }

    /// Replace all three values at once
    pub async fn write(&self, shards: FlagShards) {
        let snapshot = Arc::new(shards);
        *self.current.write().await = snapshot;
        tracing::debug!("Shard snapshot replaced");
    }
}
