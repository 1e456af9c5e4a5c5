use crate::dlog;
use crate::error::StorageError;
use crate::storage::KeyValueStore;
use crate::types::{Workout, WorkoutRecord};

/// Reads and writes the whole workout collection under one storage key.
#[derive(Debug, Clone)]
pub struct Persistence {
    key: String,
}

impl Persistence {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Replaces the stored collection with `workouts`.
    pub fn save(
        &self,
        store: &mut dyn KeyValueStore,
        workouts: &[Workout],
    ) -> Result<(), StorageError> {
        let records: Vec<WorkoutRecord> = workouts.iter().map(WorkoutRecord::from).collect();
        let json = serde_json::to_string(&records)?;
        store.set_item(&self.key, &json)?;
        dlog!("saved workouts={} bytes={}", records.len(), json.len());
        Ok(())
    }

    /// Loads the stored collection. Never fails: an absent, unreadable or
    /// corrupt slot yields an empty collection, and records that cannot be
    /// rebuilt are skipped.
    pub fn load(&self, store: &dyn KeyValueStore) -> Vec<Workout> {
        let raw = match store.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(err = %e, key = %self.key, "could not read stored workouts");
                return Vec::new();
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(err = %e, key = %self.key, "stored workouts are corrupt; ignoring");
                return Vec::new();
            }
        };

        let total = values.len();
        let workouts: Vec<Workout> = values
            .into_iter()
            .enumerate()
            .filter_map(|(idx, v)| {
                let rebuilt = serde_json::from_value::<WorkoutRecord>(v)
                    .map_err(|e| e.to_string())
                    .and_then(|r| Workout::try_from(r).map_err(|e| e.to_string()));
                match rebuilt {
                    Ok(w) => Some(w),
                    Err(err) => {
                        tracing::warn!(idx, %err, "skipping stored workout");
                        None
                    }
                }
            })
            .collect();

        dlog!("loaded workouts={} skipped={}", workouts.len(), total - workouts.len());
        workouts
    }

    pub fn clear(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        store.remove_item(&self.key)
    }
}
