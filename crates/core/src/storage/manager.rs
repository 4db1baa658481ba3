use log::{error, info, warn};

use crate::errors::CoreError;
use crate::models::record::Record;

use super::traits::KeyValueStore;

/// High-level storage operations: encode/decode the record blob and move it
/// through a [`KeyValueStore`].
///
/// Blob format: a compact JSON array of flat record objects, the same shape
/// a JSON backup uses.
pub struct StorageManager;

impl StorageManager {
    /// Serialize records to the persisted blob.
    pub fn encode(records: &[Record]) -> Result<String, CoreError> {
        serde_json::to_string(records)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize records: {e}")))
    }

    /// Parse a persisted blob back into records (order and duplicates untouched).
    pub fn decode(blob: &str) -> Result<Vec<Record>, CoreError> {
        serde_json::from_str(blob)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize records: {e}")))
    }

    /// Load the records saved under `key`.
    ///
    /// Never fails: a missing key, an unreadable store, or a blob that is not
    /// a JSON array all yield an empty list, logged at `warn`. Inside a valid
    /// array each entry is decoded on its own; entries that do not fit the
    /// record shape are skipped and logged, the rest are kept.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Vec<Record> {
        let blob = match store.load(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!(
                    "event=store_load module=storage status=ok backend={} key={} records=0 reason=absent",
                    store.name(),
                    key
                );
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "event=store_load module=storage status=fallback backend={} key={} reason=read_failed error={}",
                    store.name(),
                    key,
                    e
                );
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&blob) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "event=store_load module=storage status=fallback backend={} key={} reason=corrupt_blob bytes={} error={}",
                    store.name(),
                    key,
                    blob.len(),
                    e
                );
                return Vec::new();
            }
        };

        let total = entries.len();
        let records: Vec<Record> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<Record>(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        "event=store_load module=storage status=skip backend={} key={} index={} error={}",
                        store.name(),
                        key,
                        index,
                        e
                    );
                    None
                }
            })
            .collect();

        info!(
            "event=store_load module=storage status=ok backend={} key={} records={} skipped={}",
            store.name(),
            key,
            records.len(),
            total - records.len()
        );
        records
    }

    /// Replace the blob under `key` with `records`.
    /// Any failure is reported as `CoreError::Persistence`.
    pub fn save<S: KeyValueStore + ?Sized>(
        store: &mut S,
        key: &str,
        records: &[Record],
    ) -> Result<(), CoreError> {
        let blob = Self::encode(records)?;
        if let Err(e) = store.save(key, &blob) {
            error!(
                "event=store_save module=storage status=error backend={} key={} records={} error={}",
                store.name(),
                key,
                records.len(),
                e
            );
            return Err(match e {
                CoreError::Persistence(_) => e,
                other => CoreError::Persistence(other.to_string()),
            });
        }
        Ok(())
    }
}
