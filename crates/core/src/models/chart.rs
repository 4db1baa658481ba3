use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::stats::DailyStatus;

/// A single bar of the daily income chart.
///
/// The core generates these; the frontend just renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// The day this bar represents
    pub date: NaiveDate,

    /// Total income recorded that day, 0 when there is no record
    pub total: f64,

    /// Position relative to the daily target (drives bar color)
    pub status: DailyStatus,
}
