pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use log::info;
use models::{
    backup::PendingImport,
    chart::ChartPoint,
    ledger::{Ledger, UpsertOutcome},
    record::Record,
    settings::Settings,
    stats::{DailyStatus, DashboardStats, PeriodComparison, ProgressBand},
};
use services::{
    analytics_service::AnalyticsService, backup_service::BackupService,
    chart_service::ChartService, ledger_service::LedgerService,
};
use storage::{manager::StorageManager, traits::KeyValueStore};

use errors::CoreError;

/// Main entry point for the Income Tracker core library.
/// Holds the ledger, the settings, the persistence backend, and all
/// services needed to operate on them.
///
/// Every mutation is applied to a copy of the ledger, persisted, and only
/// then committed: if the store rejects the write, the in-memory ledger
/// stays exactly as it was.
#[must_use]
pub struct IncomeTracker<S: KeyValueStore> {
    ledger: Ledger,
    settings: Settings,
    store: S,
    ledger_service: LedgerService,
    analytics_service: AnalyticsService,
    chart_service: ChartService,
    backup_service: BackupService,
}

impl<S: KeyValueStore> std::fmt::Debug for IncomeTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomeTracker")
            .field("records", &self.ledger.len())
            .field("settings", &self.settings)
            .field("store", &self.store.name())
            .finish()
    }
}

impl<S: KeyValueStore> IncomeTracker<S> {
    /// Load the ledger from `store` with the given settings.
    ///
    /// A missing or unparsable blob opens an empty ledger; only invalid
    /// settings are an error.
    pub fn open(store: S, settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(store, settings))
    }

    /// Load the ledger from `store` with default settings.
    pub fn open_default(store: S) -> Self {
        Self::build(store, Settings::default())
    }

    // ── Records ─────────────────────────────────────────────────────

    /// Whether a record for `date` already exists. Ask the user before
    /// calling [`upsert`](Self::upsert) with `overwrite = true`.
    #[must_use]
    pub fn has_conflict(&self, date: NaiveDate) -> bool {
        self.ledger_service.has_conflict(&self.ledger, date)
    }

    /// Insert a record, or replace the one with the same date when
    /// `overwrite` is set.
    ///
    /// With a conflicting date and `overwrite = false` nothing is changed
    /// or persisted and the outcome reports `applied = false`.
    pub fn upsert(&mut self, record: Record, overwrite: bool) -> Result<UpsertOutcome, CoreError> {
        self.ledger_service
            .validate_record(&record, &self.settings.source_names)?;

        let date = record.date;
        if !overwrite && self.has_conflict(date) {
            info!("event=record_upsert module=tracker status=skip date={date} reason=conflict");
            return Ok(UpsertOutcome::DECLINED);
        }

        let mut next = self.ledger.clone();
        let outcome = self.ledger_service.upsert(&mut next, record, overwrite);
        self.commit(next)?;

        info!(
            "event=record_upsert module=tracker status=ok date={date} replaced={} records={}",
            outcome.replaced,
            self.ledger.len()
        );
        Ok(outcome)
    }

    /// Delete the record for `date`. Returns whether one was removed.
    /// The ledger is persisted even when nothing matched.
    pub fn delete(&mut self, date: NaiveDate) -> Result<bool, CoreError> {
        Ok(self.take_for_edit(date)?.is_some())
    }

    /// Remove the record for `date` and hand it back, so its values can be
    /// loaded into an edit form and saved again with [`upsert`](Self::upsert).
    pub fn take_for_edit(&mut self, date: NaiveDate) -> Result<Option<Record>, CoreError> {
        let mut next = self.ledger.clone();
        let removed = self.ledger_service.remove(&mut next, date);
        self.commit(next)?;

        info!(
            "event=record_delete module=tracker status=ok date={date} removed={} records={}",
            removed.is_some(),
            self.ledger.len()
        );
        Ok(removed)
    }

    /// Get the record for a single date.
    #[must_use]
    pub fn find(&self, date: NaiveDate) -> Option<&Record> {
        self.ledger_service.find(&self.ledger, date)
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.ledger.records
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.ledger.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    #[must_use]
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.ledger.records.first().map(|r| r.date)
    }

    #[must_use]
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.ledger.records.last().map(|r| r.date)
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Records with `start <= date <= end`, oldest first.
    /// If either bound is `None` the full ledger is returned unfiltered.
    #[must_use]
    pub fn query_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<&Record> {
        self.ledger_service.query_range(&self.ledger, start, end)
    }

    /// [`query_range`](Self::query_range) with bounds as entered in a date
    /// input: `YYYY-MM-DD`, or an empty string for "no bound".
    pub fn query_range_str(&self, start: &str, end: &str) -> Result<Vec<&Record>, CoreError> {
        let start = parse_bound("start", start)?;
        let end = parse_bound("end", end)?;
        Ok(self.query_range(start, end))
    }

    /// Records dated on or after `today - window_days`.
    #[must_use]
    pub fn query_period_at(&self, today: NaiveDate, window_days: u64) -> Vec<&Record> {
        self.ledger_service
            .query_period(&self.ledger, today, window_days)
    }

    /// [`query_period_at`](Self::query_period_at) using today's date (UTC).
    #[must_use]
    pub fn query_period(&self, window_days: u64) -> Vec<&Record> {
        self.query_period_at(today_utc(), window_days)
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Sum of record totals; 0 for no records.
    #[must_use]
    pub fn aggregate_total<'a, I>(&self, records: I) -> f64
    where
        I: IntoIterator<Item = &'a Record>,
    {
        self.analytics_service.aggregate_total(records)
    }

    /// Compare two period totals (e.g. this week against last week).
    #[must_use]
    pub fn comparison(&self, current: f64, previous: f64, label: &str) -> PeriodComparison {
        self.analytics_service.comparison(current, previous, label)
    }

    /// Classify a day total against the configured daily target.
    #[must_use]
    pub fn daily_status(&self, total: f64) -> DailyStatus {
        self.analytics_service
            .daily_status(total, self.settings.daily_target)
    }

    #[must_use]
    pub fn progress_band(&self, progress_pct: f64) -> ProgressBand {
        self.analytics_service.progress_band(progress_pct)
    }

    /// All dashboard numbers for `today`.
    #[must_use]
    pub fn statistics_snapshot(&self, today: NaiveDate) -> DashboardStats {
        self.analytics_service
            .statistics_snapshot(&self.ledger, &self.settings, today)
    }

    /// [`statistics_snapshot`](Self::statistics_snapshot) for today's date (UTC).
    #[must_use]
    pub fn statistics_snapshot_now(&self) -> DashboardStats {
        self.statistics_snapshot(today_utc())
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// Seven daily totals ending at `today`, oldest first.
    #[must_use]
    pub fn chart_series(&self, today: NaiveDate) -> Vec<ChartPoint> {
        self.chart_service
            .chart_series(&self.ledger, today, self.settings.daily_target)
    }

    /// [`chart_series`](Self::chart_series) for today's date (UTC).
    #[must_use]
    pub fn chart_series_now(&self) -> Vec<ChartPoint> {
        self.chart_series(today_utc())
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// A copy of every record, oldest first, for external exporters.
    #[must_use]
    pub fn export_snapshot(&self) -> Vec<Record> {
        self.ledger.records.clone()
    }

    /// All records as a pretty-printed JSON backup.
    pub fn export_json(&self) -> Result<String, CoreError> {
        self.backup_service.export_json(&self.ledger.records)
    }

    /// All records as a CSV table with a status column.
    #[must_use]
    pub fn export_csv(&self) -> String {
        self.backup_service
            .export_csv(&self.ledger.records, &self.settings)
    }

    /// Suggested file name for a JSON backup taken on `date`.
    #[must_use]
    pub fn backup_filename(&self, date: NaiveDate) -> String {
        self.backup_service.backup_filename(date)
    }

    /// Suggested file name for a CSV export taken on `date`.
    #[must_use]
    pub fn csv_filename(&self, date: NaiveDate) -> String {
        self.backup_service.csv_filename(date)
    }

    /// Parse a JSON backup without touching the ledger.
    /// Fails with `CoreError::ImportParse` on anything malformed.
    pub fn parse_import(&self, json: &str) -> Result<PendingImport, CoreError> {
        self.backup_service.parse_import(json)
    }

    /// Replace the whole ledger with `records` (destructive; confirm first).
    ///
    /// Records are sorted by date; when a date repeats the later entry wins.
    /// Returns the number of records now in the ledger.
    pub fn import_replace(&mut self, records: impl Into<Vec<Record>>) -> Result<usize, CoreError> {
        let records = records.into();
        let received = records.len();
        let next = self.ledger_service.normalize(records);
        self.commit(next)?;

        info!(
            "event=import_replace module=tracker status=ok received={received} records={}",
            self.ledger.len()
        );
        Ok(self.ledger.len())
    }

    // ── Settings & Store ────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change targets, source names, or the storage key.
    ///
    /// A new storage key takes effect immediately: the current ledger is
    /// written under it before the settings are switched. The blob under the
    /// old key is left as it was.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        settings.validate()?;
        if settings.storage_key != self.settings.storage_key {
            StorageManager::save(&mut self.store, &settings.storage_key, &self.ledger.records)?;
            info!(
                "event=storage_key_change module=tracker status=ok from={} to={} records={}",
                self.settings.storage_key,
                settings.storage_key,
                self.ledger.len()
            );
        }
        self.settings = settings;
        Ok(())
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give the persistence backend back to the host.
    pub fn into_store(self) -> S {
        self.store
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(store: S, settings: Settings) -> Self {
        let ledger_service = LedgerService::new();
        let loaded = StorageManager::load(&store, &settings.storage_key);
        let ledger = ledger_service.normalize(loaded);

        Self {
            ledger,
            settings,
            store,
            ledger_service,
            analytics_service: AnalyticsService::new(),
            chart_service: ChartService::new(),
            backup_service: BackupService::new(),
        }
    }

    /// Persist `next`, then make it the live ledger.
    fn commit(&mut self, next: Ledger) -> Result<(), CoreError> {
        StorageManager::save(&mut self.store, &self.settings.storage_key, &next.records)?;
        self.ledger = next;
        Ok(())
    }
}

fn today_utc() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn parse_bound(field: &str, value: &str) -> Result<Option<NaiveDate>, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| CoreError::validation(field, format!("'{trimmed}' is not a YYYY-MM-DD date: {e}")))
}
