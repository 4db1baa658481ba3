use chrono::NaiveDate;
use log::warn;

use crate::errors::CoreError;
use crate::models::backup::PendingImport;
use crate::models::record::Record;
use crate::models::settings::Settings;
use crate::services::analytics_service::AnalyticsService;

/// Turns records into backup documents (JSON, CSV) and parses JSON backups.
pub struct BackupService {
    analytics_service: AnalyticsService,
}

impl BackupService {
    pub fn new() -> Self {
        Self {
            analytics_service: AnalyticsService::new(),
        }
    }

    /// Pretty-printed JSON array, one object per record. Totals are not written.
    pub fn export_json(&self, records: &[Record]) -> Result<String, CoreError> {
        serde_json::to_string_pretty(records)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize records to JSON: {e}")))
    }

    /// Comma-separated table with a header row.
    /// Columns: Date, one per source, Total, Notes, Status
    pub fn export_csv(&self, records: &[Record], settings: &Settings) -> String {
        let mut csv = String::from("Date");
        for name in &settings.source_names {
            csv.push(',');
            csv.push_str(&escape_csv(name));
        }
        csv.push_str(",Total,Notes,Status\n");

        for record in records {
            let total = record.total();
            let status = self
                .analytics_service
                .daily_status(total, settings.daily_target);
            csv.push_str(&record.date.to_string());
            for amount in record.amounts.iter() {
                csv.push_str(&format!(",{amount}"));
            }
            csv.push_str(&format!(
                ",{},{},{}\n",
                total,
                escape_csv(record.notes.as_deref().unwrap_or("")),
                status.label(),
            ));
        }
        csv
    }

    /// Parse a JSON backup. Nothing is applied: the caller confirms and then
    /// passes the result to the tracker.
    ///
    /// Anything that is not an array of record-shaped objects is an
    /// `ImportParse` error.
    pub fn parse_import(&self, json: &str) -> Result<PendingImport, CoreError> {
        let records: Vec<Record> = serde_json::from_str(json).map_err(|e| {
            warn!(
                "event=import_parse module=backup status=error bytes={} error={}",
                json.len(),
                e
            );
            CoreError::ImportParse(e.to_string())
        })?;
        Ok(PendingImport::new(records))
    }

    /// `backup-<ISO date>.json`
    pub fn backup_filename(&self, date: NaiveDate) -> String {
        format!("backup-{date}.json")
    }

    /// `income-<ISO date>.csv`
    pub fn csv_filename(&self, date: NaiveDate) -> String {
        format!("income-{date}.csv")
    }
}

impl Default for BackupService {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote fields containing commas, quotes, or newlines.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
