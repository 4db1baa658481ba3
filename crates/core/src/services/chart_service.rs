use chrono::{Days, NaiveDate};

use crate::models::chart::ChartPoint;
use crate::models::ledger::Ledger;
use crate::models::record::Record;
use crate::services::analytics_service::AnalyticsService;
use crate::services::ledger_service::LedgerService;

/// Number of bars in the daily income chart.
pub const CHART_DAYS: u64 = 7;

/// Generates chart-ready data sets from the ledger.
///
/// The core computes all the numbers; the frontend only renders.
pub struct ChartService {
    ledger_service: LedgerService,
    analytics_service: AnalyticsService,
}

impl ChartService {
    pub fn new() -> Self {
        Self {
            ledger_service: LedgerService::new(),
            analytics_service: AnalyticsService::new(),
        }
    }

    /// One point per day for the `CHART_DAYS` days ending at `today`
    /// (inclusive), oldest first. Days without a record have a total of 0.
    pub fn chart_series(&self, ledger: &Ledger, today: NaiveDate, daily_target: f64) -> Vec<ChartPoint> {
        self.daily_series(ledger, today, CHART_DAYS, daily_target)
    }

    /// Same as [`chart_series`](Self::chart_series) with a custom number of days.
    pub fn daily_series(
        &self,
        ledger: &Ledger,
        today: NaiveDate,
        days: u64,
        daily_target: f64,
    ) -> Vec<ChartPoint> {
        (0..days)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| {
                let total = self
                    .ledger_service
                    .find(ledger, date)
                    .map(Record::total)
                    .unwrap_or(0.0);
                ChartPoint {
                    date,
                    total,
                    status: self.analytics_service.daily_status(total, daily_target),
                }
            })
            .collect()
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
