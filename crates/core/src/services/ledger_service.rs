use chrono::{Datelike, Days, NaiveDate};

use crate::errors::CoreError;
use crate::models::ledger::{Ledger, UpsertOutcome};
use crate::models::record::{Record, SOURCE_COUNT};

/// Manages the daily records: one per date, always sorted by date.
///
/// Pure business logic: no I/O, no clock.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Check a record before it is written.
    ///
    /// Rules:
    /// - Every source amount must be a finite number
    /// - Every source amount must be zero or positive
    ///
    /// `source_names` is only used to name the offending field.
    pub fn validate_record(
        &self,
        record: &Record,
        source_names: &[String; SOURCE_COUNT],
    ) -> Result<(), CoreError> {
        for (amount, name) in record.amounts.iter().zip(source_names) {
            if !amount.is_finite() {
                return Err(CoreError::validation(
                    name.as_str(),
                    format!("amount must be a number, got {amount}"),
                ));
            }
            if amount < 0.0 {
                return Err(CoreError::validation(
                    name.as_str(),
                    format!("amount must not be negative, got {amount}"),
                ));
            }
        }
        Ok(())
    }

    /// Whether a record for `date` already exists.
    pub fn has_conflict(&self, ledger: &Ledger, date: NaiveDate) -> bool {
        Self::position(ledger, date).is_ok()
    }

    /// Insert `record`, or replace the record with the same date when
    /// `overwrite` is set. Keeps the ledger sorted (binary insert, O(log n) search).
    pub fn upsert(&self, ledger: &mut Ledger, record: Record, overwrite: bool) -> UpsertOutcome {
        match Self::position(ledger, record.date) {
            Ok(idx) if overwrite => {
                ledger.records[idx] = record;
                UpsertOutcome::REPLACED
            }
            Ok(_) => UpsertOutcome::DECLINED,
            Err(idx) => {
                ledger.records.insert(idx, record);
                UpsertOutcome::INSERTED
            }
        }
    }

    /// Remove the record for `date`. Returns the removed record, if any.
    pub fn remove(&self, ledger: &mut Ledger, date: NaiveDate) -> Option<Record> {
        Self::position(ledger, date)
            .ok()
            .map(|idx| ledger.records.remove(idx))
    }

    /// Look up the record for a single date.
    pub fn find<'a>(&self, ledger: &'a Ledger, date: NaiveDate) -> Option<&'a Record> {
        Self::position(ledger, date)
            .ok()
            .map(|idx| &ledger.records[idx])
    }

    /// Records with `start <= date <= end`, in ledger order.
    ///
    /// If either bound is missing the whole ledger is returned: a single
    /// open bound disables filtering on both sides.
    pub fn query_range<'a>(
        &self,
        ledger: &'a Ledger,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<&'a Record> {
        match (start, end) {
            (Some(start), Some(end)) => ledger
                .records
                .iter()
                .filter(|r| r.date >= start && r.date <= end)
                .collect(),
            _ => ledger.records.iter().collect(),
        }
    }

    /// Records with `date >= today - window_days` (inclusive).
    ///
    /// Dates after `today` are included as well; the window has no upper bound.
    pub fn query_period<'a>(
        &self,
        ledger: &'a Ledger,
        today: NaiveDate,
        window_days: u64,
    ) -> Vec<&'a Record> {
        match today.checked_sub_days(Days::new(window_days)) {
            Some(from) => ledger.records.iter().filter(|r| r.date >= from).collect(),
            // window reaches past the earliest representable date
            None => ledger.records.iter().collect(),
        }
    }

    /// Records with `from <= date < until`.
    pub fn query_half_open<'a>(
        &self,
        ledger: &'a Ledger,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Vec<&'a Record> {
        ledger
            .records
            .iter()
            .filter(|r| r.date >= from && r.date < until)
            .collect()
    }

    /// Records in the given calendar month of the given year.
    pub fn query_month<'a>(&self, ledger: &'a Ledger, year: i32, month: u32) -> Vec<&'a Record> {
        ledger
            .records
            .iter()
            .filter(|r| r.date.year() == year && r.date.month() == month)
            .collect()
    }

    /// Bring an arbitrary list of records into ledger shape: sorted by date,
    /// one record per date. When a date repeats, the later entry wins.
    pub fn normalize(&self, mut records: Vec<Record>) -> Ledger {
        // stable: equal dates keep their input order
        records.sort_by_key(|r| r.date);

        let mut out: Vec<Record> = Vec::with_capacity(records.len());
        for record in records {
            match out.last_mut() {
                Some(last) if last.date == record.date => *last = record,
                _ => out.push(record),
            }
        }
        Ledger { records: out }
    }

    fn position(ledger: &Ledger, date: NaiveDate) -> Result<usize, usize> {
        ledger.records.binary_search_by_key(&date, |r| r.date)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
