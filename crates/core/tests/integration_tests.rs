// ═══════════════════════════════════════════════════════════════════
// Integration Tests — IncomeTracker facade end to end
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use income_tracker_core::errors::CoreError;
use income_tracker_core::models::ledger::UpsertOutcome;
use income_tracker_core::models::record::Record;
use income_tracker_core::models::settings::{Settings, DEFAULT_STORAGE_KEY};
use income_tracker_core::models::stats::{Comparison, DailyStatus, ProgressBand};
use income_tracker_core::storage::file::FileStore;
use income_tracker_core::storage::manager::StorageManager;
use income_tracker_core::storage::memory::MemoryStore;
use income_tracker_core::storage::traits::KeyValueStore;
use income_tracker_core::IncomeTracker;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// In-memory store that can be told to reject writes.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: bool,
    writes: usize,
}

impl KeyValueStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        self.inner.load(key)
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), CoreError> {
        if self.fail_writes {
            return Err(CoreError::Persistence("storage full".into()));
        }
        self.writes += 1;
        self.inner.save(key, blob)
    }
}

/// Tracker holding the May 2024 ledger: 15 on the 1st, 15 on the 8th.
fn may_tracker() -> IncomeTracker<MemoryStore> {
    let mut tracker = IncomeTracker::open_default(MemoryStore::new());
    tracker
        .upsert(Record::new(d(2024, 5, 1), [10.0, 3.0, 2.0]), false)
        .unwrap();
    tracker
        .upsert(Record::new(d(2024, 5, 8), [5.0, 5.0, 5.0]), false)
        .unwrap();
    tracker
}

fn persisted(tracker: &IncomeTracker<MemoryStore>) -> Vec<Record> {
    StorageManager::decode(tracker.store().get(DEFAULT_STORAGE_KEY).unwrap()).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Opening
// ═══════════════════════════════════════════════════════════════════

mod opening {
    use super::*;

    #[test]
    fn empty_store_opens_empty() {
        let tracker = IncomeTracker::open_default(MemoryStore::new());
        assert!(tracker.is_empty());
        assert_eq!(tracker.earliest_date(), None);
    }

    #[test]
    fn corrupt_blob_opens_empty() {
        let store = MemoryStore::with_entry(DEFAULT_STORAGE_KEY, "not json at all");
        let tracker = IncomeTracker::open_default(store);
        assert_eq!(tracker.record_count(), 0);
    }

    #[test]
    fn unsorted_duplicated_blob_is_normalized() {
        let blob = r#"[
            {"date":"2024-05-08","ava":1,"skip":0,"roa":0,"notes":""},
            {"date":"2024-05-01","ava":2,"skip":0,"roa":0,"notes":""},
            {"date":"2024-05-08","ava":3,"skip":0,"roa":0,"notes":""}
        ]"#;
        let tracker = IncomeTracker::open_default(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, blob));
        assert_eq!(tracker.record_count(), 2);
        assert_eq!(tracker.earliest_date(), Some(d(2024, 5, 1)));
        assert_eq!(tracker.find(d(2024, 5, 8)).unwrap().total(), 3.0);
    }

    #[test]
    fn malformed_entry_does_not_drop_the_rest() {
        let blob = r#"[
            {"date":"2024-05-01","ava":10,"skip":3,"roa":2,"notes":""},
            {"date":"2024-05-02","ava":"5","skip":0,"roa":0,"notes":""},
            {"date":"2024-05-08","ava":5,"skip":5,"roa":5,"notes":""}
        ]"#;
        let mut tracker =
            IncomeTracker::open_default(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, blob));
        assert_eq!(tracker.record_count(), 2);
        assert!(tracker.find(d(2024, 5, 2)).is_none());

        tracker
            .upsert(Record::new(d(2024, 5, 9), [1.0, 1.0, 1.0]), false)
            .unwrap();
        let dates: Vec<NaiveDate> = persisted(&tracker).iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 5, 1), d(2024, 5, 8), d(2024, 5, 9)]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = Settings {
            monthly_target: -1.0,
            ..Settings::default()
        };
        let result = IncomeTracker::open(MemoryStore::new(), settings);
        assert!(matches!(result, Err(CoreError::InvalidSettings(_))));
    }

    #[test]
    fn custom_storage_key_is_used() {
        let settings = Settings {
            storage_key: "income_v2".into(),
            ..Settings::default()
        };
        let mut tracker = IncomeTracker::open(MemoryStore::new(), settings).unwrap();
        tracker
            .upsert(Record::new(d(2024, 5, 1), [1.0, 1.0, 1.0]), false)
            .unwrap();
        assert!(tracker.store().get("income_v2").is_some());
        assert!(tracker.store().get(DEFAULT_STORAGE_KEY).is_none());
    }

    #[test]
    fn debug_output_is_compact() {
        let tracker = may_tracker();
        let debug = format!("{tracker:?}");
        assert!(debug.contains("IncomeTracker"));
        assert!(debug.contains("records: 2"));
        assert!(debug.contains("memory"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Upsert & conflicts
// ═══════════════════════════════════════════════════════════════════

mod upsert {
    use super::*;

    #[test]
    fn insert_persists_whole_store() {
        let tracker = may_tracker();
        assert_eq!(persisted(&tracker), tracker.records());
    }

    #[test]
    fn declined_overwrite_leaves_store_unchanged() {
        let mut tracker = may_tracker();
        assert!(tracker.has_conflict(d(2024, 5, 1)));
        let before = tracker.export_snapshot();

        let outcome = tracker
            .upsert(Record::new(d(2024, 5, 1), [50.0, 0.0, 0.0]), false)
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::DECLINED);
        assert_eq!(tracker.records(), before.as_slice());
        assert_eq!(persisted(&tracker), before);
    }

    #[test]
    fn confirmed_overwrite_replaces() {
        let mut tracker = may_tracker();
        let outcome = tracker
            .upsert(Record::with_notes(d(2024, 5, 1), [50.0, 0.0, 0.0], "bonus"), true)
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::REPLACED);
        assert_eq!(tracker.record_count(), 2);
        let r = tracker.find(d(2024, 5, 1)).unwrap();
        assert_eq!(r.total(), 50.0);
        assert_eq!(r.notes.as_deref(), Some("bonus"));
        assert_eq!(persisted(&tracker)[0].total(), 50.0);
    }

    #[test]
    fn store_stays_sorted_and_unique() {
        let mut tracker = IncomeTracker::open_default(MemoryStore::new());
        for (day, overwrite) in [(9, false), (2, false), (9, true), (5, false), (2, false), (1, true)] {
            tracker
                .upsert(Record::new(d(2024, 5, day), [day as f64, 0.0, 0.0]), overwrite)
                .unwrap();
        }
        let dates: Vec<NaiveDate> = tracker.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 5, 1), d(2024, 5, 2), d(2024, 5, 5), d(2024, 5, 9)]);
    }

    #[test]
    fn nan_amount_is_rejected_before_any_change() {
        let mut tracker = may_tracker();
        let err = tracker
            .upsert(Record::new(d(2024, 5, 2), [1.0, 1.0, f64::NAN]), false)
            .unwrap_err();
        match err {
            CoreError::Validation { field, .. } => assert_eq!(field, "ROA Gather"),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(tracker.record_count(), 2);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut tracker = may_tracker();
        let result = tracker.upsert(Record::new(d(2024, 5, 2), [-1.0, 0.0, 0.0]), true);
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn write_failure_rolls_back() {
        let mut tracker = IncomeTracker::open_default(FlakyStore::default());
        tracker
            .upsert(Record::new(d(2024, 5, 1), [1.0, 2.0, 3.0]), false)
            .unwrap();

        tracker.store_mut().fail_writes = true;
        let err = tracker
            .upsert(Record::new(d(2024, 5, 2), [4.0, 5.0, 6.0]), false)
            .unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
        assert_eq!(tracker.record_count(), 1);
        assert!(tracker.find(d(2024, 5, 2)).is_none());

        let err = tracker
            .upsert(Record::new(d(2024, 5, 1), [9.0, 9.0, 9.0]), true)
            .unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
        assert_eq!(tracker.find(d(2024, 5, 1)).unwrap().total(), 6.0);
        assert_eq!(tracker.store().writes, 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Delete & edit
// ═══════════════════════════════════════════════════════════════════

mod delete {
    use super::*;

    #[test]
    fn delete_existing() {
        let mut tracker = may_tracker();
        assert!(tracker.delete(d(2024, 5, 1)).unwrap());
        assert_eq!(tracker.record_count(), 1);
        assert_eq!(persisted(&tracker).len(), 1);
    }

    #[test]
    fn delete_missing_still_persists() {
        let mut tracker = IncomeTracker::open_default(FlakyStore::default());
        assert!(!tracker.delete(d(2024, 5, 1)).unwrap());
        assert_eq!(tracker.store().writes, 1);
        assert_eq!(tracker.store().inner.get(DEFAULT_STORAGE_KEY), Some("[]"));
    }

    #[test]
    fn delete_write_failure_keeps_record() {
        let mut tracker = IncomeTracker::open_default(FlakyStore::default());
        tracker
            .upsert(Record::new(d(2024, 5, 1), [1.0, 2.0, 3.0]), false)
            .unwrap();
        tracker.store_mut().fail_writes = true;
        assert!(tracker.delete(d(2024, 5, 1)).is_err());
        assert!(tracker.find(d(2024, 5, 1)).is_some());
    }

    #[test]
    fn take_for_edit_then_save_again() {
        let mut tracker = may_tracker();
        let mut record = tracker.take_for_edit(d(2024, 5, 8)).unwrap().unwrap();
        assert!(!tracker.has_conflict(d(2024, 5, 8)));

        record.amounts.0[0] = 20.0;
        let outcome = tracker.upsert(record, false).unwrap();
        assert_eq!(outcome, UpsertOutcome::INSERTED);
        assert_eq!(tracker.find(d(2024, 5, 8)).unwrap().total(), 30.0);
    }

    #[test]
    fn take_for_edit_missing_is_none() {
        let mut tracker = may_tracker();
        assert!(tracker.take_for_edit(d(2020, 1, 1)).unwrap().is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Queries & analytics
// ═══════════════════════════════════════════════════════════════════

mod queries {
    use super::*;

    #[test]
    fn range_total_is_thirty() {
        let tracker = may_tracker();
        let range = tracker.query_range(Some(d(2024, 5, 1)), Some(d(2024, 5, 8)));
        assert_eq!(tracker.aggregate_total(range), 30.0);
    }

    #[test]
    fn range_with_one_bound_is_unfiltered() {
        let tracker = may_tracker();
        assert_eq!(tracker.query_range(Some(d(2024, 5, 2)), None).len(), 2);
    }

    #[test]
    fn range_from_strings() {
        let tracker = may_tracker();
        assert_eq!(tracker.query_range_str("2024-05-02", "2024-05-31").unwrap().len(), 1);
        assert_eq!(tracker.query_range_str("", "2024-05-02").unwrap().len(), 2);
        assert_eq!(tracker.query_range_str(" ", " ").unwrap().len(), 2);
    }

    #[test]
    fn range_from_bad_string_is_validation_error() {
        let tracker = may_tracker();
        match tracker.query_range_str("05/01/2024", "2024-05-08") {
            Err(CoreError::Validation { field, .. }) => assert_eq!(field, "start"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn period_relative_to_explicit_today() {
        let tracker = may_tracker();
        assert_eq!(tracker.query_period_at(d(2024, 5, 10), 7).len(), 1);
        assert_eq!(tracker.query_period_at(d(2024, 5, 8), 7).len(), 2);
    }

    #[test]
    fn period_with_clock_covers_recent_records() {
        let mut tracker = IncomeTracker::open_default(MemoryStore::new());
        let today = chrono::Utc::now().date_naive();
        tracker.upsert(Record::new(today, [1.0, 1.0, 1.0]), false).unwrap();
        assert_eq!(tracker.query_period(7).len(), 1);
        assert_eq!(tracker.statistics_snapshot_now().as_of_date, today);
        assert_eq!(tracker.chart_series_now().last().unwrap().total, 3.0);
    }

    #[test]
    fn daily_status_uses_settings() {
        let tracker = may_tracker();
        assert_eq!(tracker.daily_status(15.0), DailyStatus::OnTarget);
        assert_eq!(tracker.daily_status(15.5), DailyStatus::AboveTarget { delta: 0.5 });
    }

    #[test]
    fn comparison_and_band_passthrough() {
        let tracker = may_tracker();
        assert_eq!(tracker.comparison(0.0, 0.0, "yesterday").comparison, Comparison::NoBaseline);
        assert_eq!(tracker.progress_band(80.0), ProgressBand::Strong);
    }

    #[test]
    fn snapshot_for_may() {
        let tracker = may_tracker();
        let stats = tracker.statistics_snapshot(d(2024, 5, 10));
        assert_eq!(stats.month_income, 30.0);
        assert_eq!(stats.average_income, 15.0);
        assert_eq!(stats.today_income, 0.0);
        assert_eq!(stats.week_income, 15.0);
        assert_eq!(stats.prev_week_income, 15.0);
        assert_eq!(stats.week_comparison.comparison, Comparison::Neutral);
    }

    #[test]
    fn chart_for_may_tenth() {
        let tracker = may_tracker();
        let series = tracker.chart_series(d(2024, 5, 10));
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, d(2024, 5, 4));
        assert_eq!(series[6].date, d(2024, 5, 10));
        let totals: Vec<f64> = series.iter().map(|p| p.total).collect();
        assert_eq!(totals, vec![0.0, 0.0, 0.0, 0.0, 15.0, 0.0, 0.0]);
    }

    #[test]
    fn set_settings_changes_targets() {
        let mut tracker = may_tracker();
        let settings = Settings {
            daily_target: 10.0,
            ..Settings::default()
        };
        tracker.set_settings(settings).unwrap();
        assert_eq!(tracker.settings().daily_target, 10.0);
        assert_eq!(tracker.daily_status(15.0), DailyStatus::AboveTarget { delta: 5.0 });

        let bad = Settings {
            daily_target: f64::INFINITY,
            ..Settings::default()
        };
        assert!(tracker.set_settings(bad).is_err());
        assert_eq!(tracker.settings().daily_target, 10.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn new_storage_key_is_written_immediately() {
        let mut tracker = may_tracker();
        let settings = Settings {
            storage_key: "income_v2".into(),
            ..Settings::default()
        };
        tracker.set_settings(settings).unwrap();

        let moved = StorageManager::decode(tracker.store().get("income_v2").unwrap()).unwrap();
        assert_eq!(moved, tracker.export_snapshot());
        assert!(tracker.store().get(DEFAULT_STORAGE_KEY).is_some());

        tracker.delete(d(2024, 5, 1)).unwrap();
        let moved = StorageManager::decode(tracker.store().get("income_v2").unwrap()).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(persisted(&tracker).len(), 2);
    }

    #[test]
    fn same_storage_key_writes_nothing() {
        let mut tracker = IncomeTracker::open_default(FlakyStore::default());
        let settings = Settings {
            daily_target: 20.0,
            ..Settings::default()
        };
        tracker.set_settings(settings).unwrap();
        assert_eq!(tracker.store().writes, 0);
    }

    #[test]
    fn failed_key_change_keeps_old_settings() {
        let mut tracker = IncomeTracker::open_default(FlakyStore::default());
        tracker.store_mut().fail_writes = true;
        let settings = Settings {
            storage_key: "income_v2".into(),
            ..Settings::default()
        };
        let result = tracker.set_settings(settings);
        assert!(matches!(result, Err(CoreError::Persistence(_))));
        assert_eq!(tracker.settings().storage_key, DEFAULT_STORAGE_KEY);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Backup & restore
// ═══════════════════════════════════════════════════════════════════

mod backup {
    use super::*;

    #[test]
    fn export_import_roundtrip_is_noop() {
        let mut tracker = may_tracker();
        tracker
            .upsert(Record::with_notes(d(2024, 4, 30), [0.5, 0.25, 0.125], "notes, with comma"), false)
            .unwrap();
        let before = tracker.export_snapshot();

        let json = tracker.export_json().unwrap();
        let pending = tracker.parse_import(&json).unwrap();
        assert_eq!(pending.len(), 3);
        tracker.import_replace(pending).unwrap();

        assert_eq!(tracker.export_snapshot(), before);
        for r in tracker.records() {
            assert_eq!(r.total(), r.amounts.iter().sum::<f64>());
        }
    }

    #[test]
    fn snapshot_reimport_keeps_content() {
        let mut tracker = may_tracker();
        let snapshot = tracker.export_snapshot();
        assert_eq!(tracker.import_replace(snapshot.clone()).unwrap(), 2);
        assert_eq!(tracker.records(), snapshot.as_slice());
    }

    #[test]
    fn import_replaces_everything() {
        let mut tracker = may_tracker();
        let json = r#"[{"date":"2023-01-02","ava":1,"skip":2,"roa":3,"notes":"old"}]"#;
        let pending = tracker.parse_import(json).unwrap();
        tracker.import_replace(pending).unwrap();
        assert_eq!(tracker.record_count(), 1);
        assert_eq!(tracker.find(d(2023, 1, 2)).unwrap().total(), 6.0);
        assert_eq!(persisted(&tracker).len(), 1);
    }

    #[test]
    fn import_sorts_and_dedupes() {
        let mut tracker = IncomeTracker::open_default(MemoryStore::new());
        let count = tracker
            .import_replace(vec![
                Record::new(d(2024, 5, 3), [1.0, 0.0, 0.0]),
                Record::new(d(2024, 5, 1), [2.0, 0.0, 0.0]),
                Record::new(d(2024, 5, 3), [3.0, 0.0, 0.0]),
            ])
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(tracker.earliest_date(), Some(d(2024, 5, 1)));
        assert_eq!(tracker.latest_date(), Some(d(2024, 5, 3)));
        assert_eq!(tracker.find(d(2024, 5, 3)).unwrap().total(), 3.0);
    }

    #[test]
    fn invalid_payload_leaves_store_unchanged() {
        let tracker = may_tracker();
        let before = tracker.export_snapshot();
        let result = tracker.parse_import("not json");
        assert!(matches!(result, Err(CoreError::ImportParse(_))));
        assert_eq!(tracker.export_snapshot(), before);
        assert_eq!(persisted(&tracker), before);
    }

    #[test]
    fn import_write_failure_keeps_old_data() {
        let mut tracker = IncomeTracker::open_default(FlakyStore::default());
        tracker
            .upsert(Record::new(d(2024, 5, 1), [1.0, 2.0, 3.0]), false)
            .unwrap();
        tracker.store_mut().fail_writes = true;
        let result = tracker.import_replace(Vec::<Record>::new());
        assert!(matches!(result, Err(CoreError::Persistence(_))));
        assert_eq!(tracker.record_count(), 1);
    }

    #[test]
    fn csv_export_lists_every_record() {
        let tracker = may_tracker();
        let csv = tracker.export_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Ava,Skip STTC,ROA Gather,Total,Notes,Status");
        assert_eq!(lines[1], "2024-05-01,10,3,2,15,,On Target");
        assert_eq!(lines[2], "2024-05-08,5,5,5,15,,On Target");
    }

    #[test]
    fn filenames() {
        let tracker = may_tracker();
        assert_eq!(tracker.backup_filename(d(2024, 5, 10)), "backup-2024-05-10.json");
        assert_eq!(tracker.csv_filename(d(2024, 5, 10)), "income-2024-05-10.csv");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Persistence across sessions
// ═══════════════════════════════════════════════════════════════════

mod sessions {
    use super::*;

    #[test]
    fn reopen_memory_store_restores_records() {
        let tracker = may_tracker();
        let before = tracker.export_snapshot();
        let reopened = IncomeTracker::open_default(tracker.into_store());
        assert_eq!(reopened.export_snapshot(), before);
        assert_eq!(reopened.aggregate_total(reopened.records()), 30.0);
    }

    #[test]
    fn reopen_file_store_restores_records() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut tracker = IncomeTracker::open_default(FileStore::new(dir.path()));
            tracker
                .upsert(Record::with_notes(d(2024, 5, 1), [10.0, 3.0, 2.0], "saved"), false)
                .unwrap();
            tracker
                .upsert(Record::new(d(2024, 5, 8), [5.0, 5.0, 5.0]), false)
                .unwrap();
        }

        let tracker = IncomeTracker::open_default(FileStore::new(dir.path()));
        assert_eq!(tracker.record_count(), 2);
        assert_eq!(tracker.find(d(2024, 5, 1)).unwrap().notes.as_deref(), Some("saved"));
        assert_eq!(tracker.statistics_snapshot(d(2024, 5, 10)).month_income, 30.0);
    }
}
