//! The health log: durable, ordered storage of measurement entries and
//! derivation of chart-ready series.
//!
//! Entries live as one JSON blob under the `healthData` key. The list is
//! append-only (plus per-item delete and full clear), and insertion order
//! is chronological order because timestamps are assigned at creation.
//! A blob that fails to deserialize is treated as an empty store rather
//! than an error: this store is the only writer, so a bad blob means a
//! schema left behind by an older app revision.

pub mod commands;

use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::models::{HealthEntry, MetricField};
use crate::storage::{KeyValue, PersistenceError};

const HEALTH_DATA_KEY: &str = "healthData";

/// One chart point: a short date label and the projected reading.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Ordering of a derived chart window. Chronological for trend charts,
/// newest-first for the "recent activity" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOrder {
    Chronological,
    NewestFirst,
}

#[derive(Clone)]
pub struct HealthLog {
    kv: Arc<dyn KeyValue>,
}

impl HealthLog {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self { kv }
    }

    /// All entries in stored (chronological) order. Absent or malformed
    /// blob means an empty log.
    pub async fn load_all(&self) -> Result<Vec<HealthEntry>, PersistenceError> {
        let Some(raw) = self.kv.get(HEALTH_DATA_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!("Discarding unreadable health blob ({} bytes): {err}", raw.len());
                Ok(Vec::new())
            }
        }
    }

    /// Append one validated entry. Read-modify-write of the full list;
    /// if the write fails nothing is persisted, so a re-read reflects the
    /// pre-append state.
    pub async fn append(&self, entry: HealthEntry) -> Result<(), PersistenceError> {
        let mut entries = self.load_all().await?;
        entries.push(entry);
        self.write_all(&entries).await
    }

    /// Remove the entry with the given id. Returns whether anything
    /// matched.
    pub async fn remove_one(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut entries = self.load_all().await?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.write_all(&entries).await?;
        Ok(true)
    }

    /// Delete every entry. Clearing an already-empty log succeeds.
    pub async fn clear_all(&self) -> Result<(), PersistenceError> {
        self.kv.delete(HEALTH_DATA_KEY).await
    }

    /// Project the last `count` entries carrying the selected reading into
    /// `(label, value)` chart points. Entries without that reading are not
    /// counted. Pure read-time transform; the only I/O is the `load_all`.
    pub async fn recent_window(
        &self,
        count: usize,
        field: MetricField,
        order: WindowOrder,
    ) -> Result<Vec<SeriesPoint>, PersistenceError> {
        let entries = self.load_all().await?;

        let mut points: Vec<SeriesPoint> = entries
            .iter()
            .filter_map(|entry| {
                field.value_of(entry).map(|value| SeriesPoint {
                    label: entry.timestamp.format("%-m/%-d/%Y").to_string(),
                    value,
                })
            })
            .collect();

        if points.len() > count {
            points.drain(..points.len() - count);
        }
        if order == WindowOrder::NewestFirst {
            points.reverse();
        }
        Ok(points)
    }

    async fn write_all(&self, entries: &[HealthEntry]) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(entries)
            .map_err(|err| PersistenceError::Write(err.to_string()))?;
        self.kv.set(HEALTH_DATA_KEY, blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::health_entry::StressAssessment;
    use crate::storage::testing::MemoryKv;
    use chrono::{DateTime, Utc};

    fn log_with_kv() -> (Arc<MemoryKv>, HealthLog) {
        let kv = Arc::new(MemoryKv::default());
        let log = HealthLog::new(kv.clone());
        (kv, log)
    }

    fn entry(heart_rate: f64, timestamp: &str) -> HealthEntry {
        HealthEntry {
            id: uuid::Uuid::new_v4().to_string(),
            heart_rate,
            sleep_hours: 7.0,
            snoring_rate: 10.0,
            respiration_rate: None,
            body_temperature: None,
            blood_oxygen: None,
            timestamp: timestamp.parse::<DateTime<Utc>>().expect("timestamp"),
            stress: None,
        }
    }

    #[tokio::test]
    async fn empty_store_loads_empty() {
        let (_kv, log) = log_with_kv();
        assert!(log.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn appended_entries_come_back_in_order() {
        let (_kv, log) = log_with_kv();
        let entries: Vec<_> = (0..5)
            .map(|i| entry(60.0 + i as f64, &format!("2024-01-0{}T08:00:00Z", i + 1)))
            .collect();
        for e in &entries {
            log.append(e.clone()).await.unwrap();
        }
        assert_eq!(log.load_all().await.unwrap(), entries);
    }

    #[tokio::test]
    async fn single_append_scenario() {
        let (_kv, log) = log_with_kv();
        let mut e = entry(72.0, "2024-01-01T08:00:00Z");
        e.sleep_hours = 7.0;
        log.append(e.clone()).await.unwrap();
        let all = log.load_all().await.unwrap();
        assert_eq!(all, vec![e]);
    }

    #[tokio::test]
    async fn clear_all_is_idempotent() {
        let (_kv, log) = log_with_kv();
        log.append(entry(70.0, "2024-01-01T08:00:00Z")).await.unwrap();
        log.clear_all().await.unwrap();
        assert!(log.load_all().await.unwrap().is_empty());
        log.clear_all().await.unwrap();
        assert!(log.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_one_deletes_only_the_matched_entry() {
        let (_kv, log) = log_with_kv();
        let keep = entry(60.0, "2024-01-01T08:00:00Z");
        let drop = entry(90.0, "2024-01-02T08:00:00Z");
        log.append(keep.clone()).await.unwrap();
        log.append(drop.clone()).await.unwrap();

        assert!(log.remove_one(&drop.id).await.unwrap());
        assert_eq!(log.load_all().await.unwrap(), vec![keep]);
        assert!(!log.remove_one("no-such-id").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_blob_is_treated_as_empty() {
        let (kv, log) = log_with_kv();
        kv.put_raw(HEALTH_DATA_KEY, "{ definitely not an entry list");
        assert!(log.load_all().await.unwrap().is_empty());
        // And the store is usable again after the next append.
        log.append(entry(72.0, "2024-01-01T08:00:00Z")).await.unwrap();
        assert_eq!(log.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn old_schema_blob_loads_with_defaults() {
        let (kv, log) = log_with_kv();
        kv.put_raw(
            HEALTH_DATA_KEY,
            r#"[{"heartRate":68,"sleepHours":8,"snoringRate":4,"timestamp":"2024-01-01T08:00:00Z"}]"#,
        );
        let all = log.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].heart_rate, 68.0);
        assert!(all[0].blood_oxygen.is_none());
    }

    #[tokio::test]
    async fn failed_write_leaves_previous_state_visible() {
        let (kv, log) = log_with_kv();
        let first = entry(70.0, "2024-01-01T08:00:00Z");
        log.append(first.clone()).await.unwrap();

        kv.fail_writes(true);
        let err = log.append(entry(99.0, "2024-01-02T08:00:00Z")).await;
        assert!(matches!(err, Err(PersistenceError::Write(_))));

        kv.fail_writes(false);
        assert_eq!(log.load_all().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn recent_window_takes_the_last_n_chronologically() {
        let (_kv, log) = log_with_kv();
        for i in 0..10 {
            log.append(entry(
                60.0 + i as f64,
                &format!("2024-01-{:02}T08:00:00Z", i + 1),
            ))
            .await
            .unwrap();
        }

        let window = log
            .recent_window(5, MetricField::HeartRate, WindowOrder::Chronological)
            .await
            .unwrap();
        assert_eq!(window.len(), 5);
        let values: Vec<f64> = window.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![65.0, 66.0, 67.0, 68.0, 69.0]);
        assert_eq!(window[0].label, "1/6/2024");
    }

    #[tokio::test]
    async fn recent_window_never_exceeds_entry_count() {
        let (_kv, log) = log_with_kv();
        for i in 0..3 {
            log.append(entry(70.0, &format!("2024-02-0{}T08:00:00Z", i + 1)))
                .await
                .unwrap();
        }
        let window = log
            .recent_window(50, MetricField::HeartRate, WindowOrder::Chronological)
            .await
            .unwrap();
        assert_eq!(window.len(), 3);
    }

    #[tokio::test]
    async fn recent_window_can_reverse_for_recent_activity() {
        let (_kv, log) = log_with_kv();
        log.append(entry(60.0, "2024-01-01T08:00:00Z")).await.unwrap();
        log.append(entry(61.0, "2024-01-02T08:00:00Z")).await.unwrap();
        let window = log
            .recent_window(2, MetricField::HeartRate, WindowOrder::NewestFirst)
            .await
            .unwrap();
        let values: Vec<f64> = window.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![61.0, 60.0]);
    }

    #[tokio::test]
    async fn recent_window_skips_entries_without_the_reading() {
        let (_kv, log) = log_with_kv();
        let mut with_oxygen = entry(70.0, "2024-01-01T08:00:00Z");
        with_oxygen.blood_oxygen = Some(97.0);
        log.append(with_oxygen).await.unwrap();
        log.append(entry(71.0, "2024-01-02T08:00:00Z")).await.unwrap();

        let window = log
            .recent_window(5, MetricField::BloodOxygen, WindowOrder::Chronological)
            .await
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].value, 97.0);
    }

    #[tokio::test]
    async fn stress_level_projects_from_assessment() {
        let (_kv, log) = log_with_kv();
        let assessed = entry(70.0, "2024-01-01T08:00:00Z")
            .with_assessment(StressAssessment::from_level(3, Some(0.9)));
        log.append(assessed).await.unwrap();
        let window = log
            .recent_window(1, MetricField::StressLevel, WindowOrder::Chronological)
            .await
            .unwrap();
        assert_eq!(window[0].value, 3.0);
    }
}
