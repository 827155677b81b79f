//! Mood-detection history: captures analyzed by the emotion backend,
//! stored newest-first under the `moodHistory` key (the capture screen
//! prepends so the freshest result renders on top).

pub mod commands;

use std::sync::Arc;

use log::warn;

use crate::models::MoodEntry;
use crate::storage::{KeyValue, PersistenceError};

const MOOD_HISTORY_KEY: &str = "moodHistory";

#[derive(Clone)]
pub struct MoodLog {
    kv: Arc<dyn KeyValue>,
}

impl MoodLog {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self { kv }
    }

    /// History in newest-first order. Absent or unreadable blob means an
    /// empty history.
    pub async fn history(&self) -> Result<Vec<MoodEntry>, PersistenceError> {
        let Some(raw) = self.kv.get(MOOD_HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!("Discarding unreadable mood blob: {err}");
                Ok(Vec::new())
            }
        }
    }

    /// Prepend a new capture.
    pub async fn record(&self, entry: MoodEntry) -> Result<(), PersistenceError> {
        let mut entries = self.history().await?;
        entries.insert(0, entry);
        self.write_all(&entries).await
    }

    pub async fn remove_one(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut entries = self.history().await?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.write_all(&entries).await?;
        Ok(true)
    }

    pub async fn clear_all(&self) -> Result<(), PersistenceError> {
        self.kv.delete(MOOD_HISTORY_KEY).await
    }

    async fn write_all(&self, entries: &[MoodEntry]) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(entries)
            .map_err(|err| PersistenceError::Write(err.to_string()))?;
        self.kv.set(MOOD_HISTORY_KEY, blob).await
    }
}
