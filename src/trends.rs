//! Per-metric wellness trends for the wellness detail view
//!
//! Unlike the readiness baselines, trend series keep every day in the window
//! and report unrecorded values as zero so the series line up by date.

use crate::models::{trailing, WellnessRecord, SECONDS_PER_HOUR};
use serde::{Deserialize, Serialize};

/// Default number of trailing days shown in a trend
pub const DEFAULT_TREND_DAYS: usize = 30;

/// A single dated value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: String,
    pub value: f64,
}

/// A named series of dated values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub points: Vec<MetricPoint>,
}

impl MetricSeries {
    fn from_records(records: &[WellnessRecord], value: impl Fn(&WellnessRecord) -> f64) -> Self {
        MetricSeries {
            points: records
                .iter()
                .map(|record| MetricPoint {
                    date: record.id.clone(),
                    value: value(record),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&MetricPoint> {
        self.points.last()
    }

    pub fn min(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }

    /// Spread between max and min, 1.0 for a flat or empty series
    pub fn range(&self) -> f64 {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) if max > min => max - min,
            _ => 1.0,
        }
    }

    /// Values that were actually recorded; gaps are stored as 0
    fn recorded_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value).filter(|v| *v > 0.0)
    }

    pub fn recorded_min(&self) -> Option<f64> {
        self.recorded_values().reduce(f64::min)
    }

    pub fn recorded_max(&self) -> Option<f64> {
        self.recorded_values().reduce(f64::max)
    }

    /// Average of the recorded (positive) values
    pub fn recorded_mean(&self) -> Option<f64> {
        let (sum, count) = self
            .recorded_values()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

/// HRV, resting HR and sleep trends over the same window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrends {
    pub hrv: MetricSeries,
    pub resting_hr: MetricSeries,
    pub sleep_hours: MetricSeries,
}

/// Build trends over the default 30-day window
pub fn metric_trends(series: &[WellnessRecord]) -> MetricTrends {
    metric_trends_for(series, DEFAULT_TREND_DAYS)
}

/// Build trends over the trailing `days` records
pub fn metric_trends_for(series: &[WellnessRecord], days: usize) -> MetricTrends {
    let window = trailing(series, days);

    MetricTrends {
        hrv: MetricSeries::from_records(window, |r| r.hrv.unwrap_or(0.0)),
        resting_hr: MetricSeries::from_records(window, |r| r.resting_hr.unwrap_or(0.0)),
        sleep_hours: MetricSeries::from_records(window, |r| {
            r.sleep_secs.unwrap_or(0.0) / SECONDS_PER_HOUR
        }),
    }
}
