use crate::errors::CoreError;

/// Durable key-value storage the tracker persists its ledger into.
///
/// The host decides what backs it (browser local storage, a file, a
/// database row). `save` must replace the value atomically: when it fails,
/// the previously saved blob has to remain readable.
pub trait KeyValueStore {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Read the blob stored under `key`, `None` when nothing was saved yet.
    fn load(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Replace the blob stored under `key`.
    fn save(&mut self, key: &str, blob: &str) -> Result<(), CoreError>;
}
