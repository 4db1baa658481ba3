use chrono::{Datelike, Days, NaiveDate};

use crate::models::ledger::Ledger;
use crate::models::record::Record;
use crate::models::settings::Settings;
use crate::models::stats::{
    Comparison, DailyStatus, DashboardStats, PeriodComparison, ProgressBand,
};
use crate::services::ledger_service::LedgerService;

/// Length of the "this week" window, in days.
pub const WEEK_DAYS: u64 = 7;

/// Computes dashboard statistics: period totals, comparisons, target status.
///
/// Every number is derived from the ledger and an explicit `today`,
/// so the same inputs always produce the same snapshot.
pub struct AnalyticsService {
    ledger_service: LedgerService,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self {
            ledger_service: LedgerService::new(),
        }
    }

    /// Sum of record totals; 0 for no records.
    pub fn aggregate_total<'a, I>(&self, records: I) -> f64
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records.into_iter().map(Record::total).sum()
    }

    /// Compare `current` against `previous`.
    ///
    /// A zero `previous` always yields `NoBaseline`, even when `current`
    /// is zero too.
    pub fn comparison(&self, current: f64, previous: f64, label: &str) -> PeriodComparison {
        let comparison = if previous == 0.0 {
            Comparison::NoBaseline
        } else {
            let delta = current - previous;
            let pct = delta / previous * 100.0;
            if delta > 0.0 {
                Comparison::Positive { delta, pct }
            } else if delta < 0.0 {
                Comparison::Negative { delta, pct }
            } else {
                Comparison::Neutral
            }
        };

        PeriodComparison {
            label: label.to_string(),
            current,
            previous,
            comparison,
        }
    }

    /// Classify a day's total against `daily_target`.
    /// A NaN total falls through to `OnTarget`.
    pub fn daily_status(&self, total: f64, daily_target: f64) -> DailyStatus {
        let delta = total - daily_target;
        if delta > 0.0 {
            DailyStatus::AboveTarget { delta }
        } else if delta < 0.0 {
            DailyStatus::BelowTarget { delta }
        } else {
            DailyStatus::OnTarget
        }
    }

    /// Bucket a monthly progress percentage.
    pub fn progress_band(&self, progress_pct: f64) -> ProgressBand {
        if progress_pct >= 100.0 {
            ProgressBand::Achieved
        } else if progress_pct >= 75.0 {
            ProgressBand::Strong
        } else if progress_pct >= 50.0 {
            ProgressBand::Moderate
        } else {
            ProgressBand::Low
        }
    }

    /// Compute the full dashboard for `today`.
    ///
    /// Computes:
    /// - Today / yesterday totals and their comparison
    /// - This week (`date >= today - 7`) vs. the week before
    ///   (`today - 14 <= date < today - 7`)
    /// - This calendar month vs. the previous one, average per recorded day
    /// - Progress toward the monthly target
    pub fn statistics_snapshot(
        &self,
        ledger: &Ledger,
        settings: &Settings,
        today: NaiveDate,
    ) -> DashboardStats {
        let ls = &self.ledger_service;

        // 1. Day
        let day_total = |date: Option<NaiveDate>| {
            date.and_then(|d| ls.find(ledger, d))
                .map(Record::total)
                .unwrap_or(0.0)
        };
        let today_income = day_total(Some(today));
        let yesterday_income = day_total(today.pred_opt());

        // 2. Week
        let week_income = self.aggregate_total(ls.query_period(ledger, today, WEEK_DAYS));
        let prev_week_income = match (
            today.checked_sub_days(Days::new(2 * WEEK_DAYS)),
            today.checked_sub_days(Days::new(WEEK_DAYS)),
        ) {
            (Some(from), Some(until)) => {
                self.aggregate_total(ls.query_half_open(ledger, from, until))
            }
            _ => 0.0,
        };

        // 3. Month
        let month_records = ls.query_month(ledger, today.year(), today.month());
        let month_income = self.aggregate_total(month_records.iter().copied());
        let month_record_count = month_records.len();
        let average_income = if month_record_count > 0 {
            month_income / month_record_count as f64
        } else {
            0.0
        };

        let (prev_year, prev_month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };
        let prev_month_income =
            self.aggregate_total(ls.query_month(ledger, prev_year, prev_month));

        // 4. Progress
        let monthly_progress_pct = month_income / settings.monthly_target * 100.0;

        DashboardStats {
            as_of_date: today,
            today_income,
            yesterday_income,
            week_income,
            prev_week_income,
            month_income,
            prev_month_income,
            month_record_count,
            average_income,
            monthly_progress_pct,
            progress_band: self.progress_band(monthly_progress_pct),
            today_status: self.daily_status(today_income, settings.daily_target),
            today_comparison: self.comparison(today_income, yesterday_income, "yesterday"),
            week_comparison: self.comparison(week_income, prev_week_income, "last week"),
            month_comparison: self.comparison(month_income, prev_month_income, "last month"),
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
