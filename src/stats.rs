/// Play statistics live in the collection database, not in the file tags. Records look them up
/// through a `StatisticsStore` handed to them at construction, once per field.
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Backing store for play statistics, keyed by source locator. Each lookup may be expensive. None
/// means the store has nothing recorded for that track.
pub trait StatisticsStore: Send + Sync {
    fn score(&self, url: &str) -> Option<i32>;
    fn rating(&self, url: &str) -> Option<i32>;
    fn play_count(&self, url: &str) -> Option<i32>;
    /// Seconds since the epoch.
    fn last_played(&self, url: &str) -> Option<i64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub score: i32,
    pub rating: i32,
    pub play_count: i32,
    pub last_played: i64,
}

/// A `StatisticsStore` held in memory, for hosts that load statistics up front.
#[derive(Debug, Default)]
pub struct MemoryStatisticsStore {
    entries: RwLock<HashMap<String, Statistics>>,
}

impl MemoryStatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, stats: Statistics) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(url.into(), stats);
        }
    }

    /// Loads a JSON object mapping locators to statistics, as exported by the collection database.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, Statistics> = serde_json::from_str(json)?;
        tracing::debug!("Loaded statistics for {} tracks", entries.len());
        Ok(MemoryStatisticsStore {
            entries: RwLock::new(entries),
        })
    }

    pub fn get(&self, url: &str) -> Option<Statistics> {
        self.entries.read().ok()?.get(url).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatisticsStore for MemoryStatisticsStore {
    fn score(&self, url: &str) -> Option<i32> {
        self.get(url).map(|s| s.score)
    }

    fn rating(&self, url: &str) -> Option<i32> {
        self.get(url).map(|s| s.rating)
    }

    fn play_count(&self, url: &str) -> Option<i32> {
        self.get(url).map(|s| s.play_count)
    }

    fn last_played(&self, url: &str) -> Option<i64> {
        self.get(url).map(|s| s.last_played)
    }
}
