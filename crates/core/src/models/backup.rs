use super::record::Record;

/// A successfully parsed backup that has not been applied yet.
///
/// Importing replaces the whole ledger, so the caller is expected to
/// confirm (e.g. "Import 12 records? Existing data will be overwritten")
/// before handing this to `IncomeTracker::import_replace`.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct PendingImport {
    records: Vec<Record>,
}

impl PendingImport {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records the backup contains.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<PendingImport> for Vec<Record> {
    fn from(pending: PendingImport) -> Self {
        pending.records
    }
}
