use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of comparing a period's income against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Comparison {
    /// Current exceeds previous by `delta` (`pct` percent of previous)
    Positive { delta: f64, pct: f64 },
    /// Current is below previous by `delta` (negative) / `pct` (negative)
    Negative { delta: f64, pct: f64 },
    /// Same amount as the previous period
    Neutral,
    /// Previous period is zero, nothing to compare against.
    /// Takes precedence over `Neutral` when both periods are zero.
    NoBaseline,
}

/// A comparison tagged with the period it was made against
/// (e.g. "yesterday", "last week").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub label: String,
    pub current: f64,
    pub previous: f64,
    pub comparison: Comparison,
}

/// How a day's total relates to the daily target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DailyStatus {
    /// `delta = total - daily_target`, positive
    AboveTarget { delta: f64 },
    /// `delta = total - daily_target`, negative
    BelowTarget { delta: f64 },
    OnTarget,
}

impl DailyStatus {
    /// Label used in the tabular export's `Status` column.
    pub fn label(&self) -> &'static str {
        match self {
            DailyStatus::AboveTarget { .. } => "Above Target",
            DailyStatus::BelowTarget { .. } => "Below Target",
            DailyStatus::OnTarget => "On Target",
        }
    }
}

impl std::fmt::Display for DailyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse bucket of monthly progress, used to color the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressBand {
    /// 100% or more of the monthly target
    Achieved,
    /// 75% up to 100%
    Strong,
    /// 50% up to 75%
    Moderate,
    /// Below 50%
    Low,
}

/// Everything the dashboard shows, computed for one `as_of_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Day the snapshot was computed for
    pub as_of_date: NaiveDate,

    pub today_income: f64,
    pub yesterday_income: f64,

    /// Records dated within the last 7 days, inclusive of `today - 7`
    pub week_income: f64,

    /// Records with `today - 14 <= date < today - 7`
    pub prev_week_income: f64,

    /// Records in the same calendar month and year as `as_of_date`
    pub month_income: f64,

    /// Records in the previous calendar month
    pub prev_month_income: f64,

    /// Number of records contributing to `month_income`
    pub month_record_count: usize,

    /// `month_income / month_record_count`, or 0 with no records
    pub average_income: f64,

    /// `month_income / monthly_target * 100`
    pub monthly_progress_pct: f64,

    pub progress_band: ProgressBand,

    pub today_status: DailyStatus,
    pub today_comparison: PeriodComparison,
    pub week_comparison: PeriodComparison,
    pub month_comparison: PeriodComparison,
}
