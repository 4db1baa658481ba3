use serde::{Deserialize, Serialize};

use super::record::Record;

/// The main data container: every daily record, one per date,
/// kept sorted by ascending date. The whole ledger is persisted as a
/// single blob after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    pub records: Vec<Record>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of an upsert attempt.
///
/// `applied == false` means a record for the date already existed and the
/// caller did not ask to overwrite it; nothing was changed or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub applied: bool,
    pub replaced: bool,
}

impl UpsertOutcome {
    pub const INSERTED: Self = Self {
        applied: true,
        replaced: false,
    };

    pub const REPLACED: Self = Self {
        applied: true,
        replaced: true,
    };

    pub const DECLINED: Self = Self {
        applied: false,
        replaced: false,
    };
}
