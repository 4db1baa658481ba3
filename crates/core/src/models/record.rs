use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of income sources every record carries an amount for.
pub const SOURCE_COUNT: usize = 3;

/// Per-source amounts of a single day, in configured source order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceAmounts(pub [f64; SOURCE_COUNT]);

impl SourceAmounts {
    pub fn new(ava: f64, skip: f64, roa: f64) -> Self {
        Self([ava, skip, roa])
    }

    /// Sum of all sources. Always recomputed, never stored.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl From<[f64; SOURCE_COUNT]> for SourceAmounts {
    fn from(amounts: [f64; SOURCE_COUNT]) -> Self {
        Self(amounts)
    }
}

/// One calendar day's income entry. The date is the unique key in the store.
///
/// **Wire shape**: serialized as the flat legacy object
/// `{"date", "ava", "skip", "roa", "notes"}` so existing backups keep
/// loading. The total is never written; a `total` key in input is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordWire", into = "RecordWire")]
pub struct Record {
    /// Calendar day (no time component)
    pub date: NaiveDate,

    /// Amount earned from each source on that day
    pub amounts: SourceAmounts,

    /// Optional free-text notes. Empty notes are normalized to `None`.
    pub notes: Option<String>,
}

impl Record {
    pub fn new(date: NaiveDate, amounts: impl Into<SourceAmounts>) -> Self {
        Self {
            date,
            amounts: amounts.into(),
            notes: None,
        }
    }

    /// Create a record with notes attached.
    pub fn with_notes(
        date: NaiveDate,
        amounts: impl Into<SourceAmounts>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amounts: amounts.into(),
            notes: normalize_notes(Some(notes.into())),
        }
    }

    /// Derived day total: the sum of all source amounts.
    pub fn total(&self) -> f64 {
        self.amounts.total()
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.is_empty())
}

/// Flat serialized form shared by the persisted blob and JSON backups.
#[derive(Serialize, Deserialize)]
struct RecordWire {
    date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_amount")]
    ava: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    skip: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    roa: f64,
    #[serde(default)]
    notes: Option<String>,
}

/// Legacy data wrote unparseable amounts as `null`; read those as zero.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl From<RecordWire> for Record {
    fn from(wire: RecordWire) -> Self {
        Self {
            date: wire.date,
            amounts: SourceAmounts::new(wire.ava, wire.skip, wire.roa),
            notes: normalize_notes(wire.notes),
        }
    }
}

impl From<Record> for RecordWire {
    fn from(record: Record) -> Self {
        let [ava, skip, roa] = record.amounts.0;
        Self {
            date: record.date,
            ava,
            skip,
            roa,
            notes: Some(record.notes.unwrap_or_default()),
        }
    }
}
