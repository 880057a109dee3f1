//! Readiness scoring from HRV, resting heart rate and sleep
//!
//! Today's values are compared against rolling baselines taken over a
//! trailing window of wellness records. Each metric becomes a normalized
//! sub-score (100 = at baseline), sub-scores above saturation are smoothed
//! with diminishing returns, and the available metrics are combined into a
//! weighted composite.
//!
//! Missing metrics do not drag the score down: only the weights of metrics
//! that are actually present are summed, so a dropout redistributes its
//! weight proportionally across the others. When nothing is available the
//! result is classified as insufficient data.

use crate::models::{round_one_decimal, trailing, WellnessRecord, SECONDS_PER_HOUR};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported for an empty series
pub const EMPTY_SERIES_STATUS: &str = "Very low readiness (rest or full recovery)";

/// Readiness engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Number of trailing records used for baselines (default: 30)
    pub window_days: usize,

    /// Minimum positive samples for a baseline to be trusted (default: 3)
    pub min_baseline_samples: usize,

    /// Weight of the HRV sub-score (default: 0.5)
    pub hrv_weight: f64,

    /// Weight of the resting HR sub-score (default: 0.25)
    pub rhr_weight: f64,

    /// Weight of the sleep sub-score (default: 0.25)
    pub sleep_weight: f64,

    /// Upper clamp applied to each sub-score (default: 150)
    pub sub_score_cap: f64,

    /// Sub-score above which diminishing returns apply (default: 100)
    pub saturation_point: f64,

    /// Fraction of the excess above saturation that still counts (default: 0.5)
    pub diminishing_factor: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        ReadinessConfig {
            window_days: 30,
            min_baseline_samples: 3,
            hrv_weight: 0.5,
            rhr_weight: 0.25,
            sleep_weight: 0.25,
            sub_score_cap: 150.0,
            saturation_point: 100.0,
            diminishing_factor: 0.5,
        }
    }
}

/// Readiness color indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessColor {
    Gray,
    Red,
    Orange,
    Yellow,
    LightGreen,
    Green,
    Purple,
}

impl ReadinessColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessColor::Gray => "gray",
            ReadinessColor::Red => "red",
            ReadinessColor::Orange => "orange",
            ReadinessColor::Yellow => "yellow",
            ReadinessColor::LightGreen => "lightgreen",
            ReadinessColor::Green => "green",
            ReadinessColor::Purple => "purple",
        }
    }
}

impl fmt::Display for ReadinessColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Readiness zones, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessZone {
    Supercompensated, // 105 and above
    High,             // 95 to 105
    Good,             // 85 to 95
    Moderate,         // 70 to 85
    Low,              // 50 to 70
    VeryLow,          // below 50
    InsufficientData,
}

impl ReadinessZone {
    /// Classify a composite readiness score
    pub fn from_score(score: f64) -> Self {
        if score >= 105.0 {
            ReadinessZone::Supercompensated
        } else if score >= 95.0 {
            ReadinessZone::High
        } else if score >= 85.0 {
            ReadinessZone::Good
        } else if score >= 70.0 {
            ReadinessZone::Moderate
        } else if score >= 50.0 {
            ReadinessZone::Low
        } else {
            ReadinessZone::VeryLow
        }
    }

    pub fn color(&self) -> ReadinessColor {
        match self {
            ReadinessZone::Supercompensated => ReadinessColor::Purple,
            ReadinessZone::High => ReadinessColor::Green,
            ReadinessZone::Good => ReadinessColor::LightGreen,
            ReadinessZone::Moderate => ReadinessColor::Yellow,
            ReadinessZone::Low => ReadinessColor::Orange,
            ReadinessZone::VeryLow => ReadinessColor::Red,
            ReadinessZone::InsufficientData => ReadinessColor::Gray,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ReadinessZone::Supercompensated => "Supercompensated (peak/race ready)",
            ReadinessZone::High => "High readiness (train hard)",
            ReadinessZone::Good => "Good readiness (moderate intensity)",
            ReadinessZone::Moderate => "Moderate readiness (aerobic base)",
            ReadinessZone::Low => "Low readiness (light recovery)",
            ReadinessZone::VeryLow => "Very low readiness (rest day)",
            ReadinessZone::InsufficientData => "Insufficient data for readiness calculation",
        }
    }
}

/// Per-metric detail behind a readiness score
///
/// Field names on the wire match the dashboard's breakdown keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadinessBreakdown {
    #[serde(rename = "HRV_today")]
    pub hrv_today: f64,
    #[serde(rename = "HRV_base")]
    pub hrv_base: f64,
    #[serde(rename = "HRV_s")]
    pub hrv_s: f64,
    #[serde(rename = "RHR_today")]
    pub rhr_today: f64,
    #[serde(rename = "RHR_base")]
    pub rhr_base: f64,
    #[serde(rename = "RHR_s")]
    pub rhr_s: f64,
    /// Last night's sleep in hours
    #[serde(rename = "Sleep_today")]
    pub sleep_today: f64,
    /// Baseline sleep in hours
    #[serde(rename = "Sleep_target")]
    pub sleep_target: f64,
    #[serde(rename = "Sleep_s")]
    pub sleep_s: f64,
    /// Unrounded composite score
    #[serde(rename = "finalScore")]
    pub final_score: f64,
}

/// One available metric's share of the composite
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub metric: &'static str,
    /// Clamped sub-score
    pub sub_score: f64,
    /// Sub-score after diminishing returns
    pub contribution: f64,
    pub weight: f64,
}

/// Readiness engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessResult {
    /// Composite score rounded to one decimal
    pub score: f64,
    pub color: ReadinessColor,
    pub status: String,
    pub breakdown: ReadinessBreakdown,
}

impl ReadinessResult {
    /// Result for a series with no records at all
    ///
    /// Reported as red, unlike a non-empty series with nothing recorded.
    pub fn empty() -> Self {
        ReadinessResult {
            score: 0.0,
            color: ReadinessColor::Red,
            status: EMPTY_SERIES_STATUS.to_string(),
            breakdown: ReadinessBreakdown::default(),
        }
    }
}

/// Readiness calculation engine
#[derive(Debug, Clone, Default)]
pub struct ReadinessCalculator {
    config: ReadinessConfig,
}

impl ReadinessCalculator {
    /// Create a calculator with the default configuration
    pub fn new() -> Self {
        ReadinessCalculator {
            config: ReadinessConfig::default(),
        }
    }

    /// Create a calculator with a custom configuration
    pub fn with_config(config: ReadinessConfig) -> Self {
        ReadinessCalculator { config }
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Score the last record of a chronological series against its trailing baselines
    pub fn calculate(&self, series: &[WellnessRecord]) -> ReadinessResult {
        let Some(today) = series.last() else {
            return ReadinessResult::empty();
        };

        let hrv_today = today.hrv.unwrap_or(0.0);
        let rhr_today = today.resting_hr.unwrap_or(0.0);
        let sleep_today = today.sleep_secs.unwrap_or(0.0);

        let window = trailing(series, self.config.window_days);

        let hrv_base = self.baseline(window.iter().filter_map(WellnessRecord::recorded_hrv));
        let rhr_base =
            self.baseline(window.iter().filter_map(WellnessRecord::recorded_resting_hr));
        let sleep_target =
            self.baseline(window.iter().filter_map(WellnessRecord::recorded_sleep_hours));

        // Lower resting HR is better, hence the inverted ratio
        let hrv_s = self.sub_score(hrv_today, hrv_base, 100.0 * hrv_today / hrv_base);
        let rhr_s = self.sub_score(rhr_today, rhr_base, 100.0 * rhr_base / rhr_today);
        let sleep_s = self.sub_score(
            sleep_today,
            sleep_target,
            100.0 * (sleep_today / SECONDS_PER_HOUR) / sleep_target,
        );

        let terms = self.terms(hrv_s, rhr_s, sleep_s);
        let weighted_sum: f64 = terms.iter().map(|t| t.weight * t.contribution).sum();
        let total_weight: f64 = terms.iter().map(|t| t.weight).sum();

        let readiness = if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            0.0
        };

        let zone = if total_weight > 0.0 {
            ReadinessZone::from_score(readiness)
        } else {
            ReadinessZone::InsufficientData
        };

        tracing::debug!(
            day = %today.id,
            hrv_s,
            rhr_s,
            sleep_s,
            total_weight,
            readiness,
            zone = ?zone,
            "Readiness calculated"
        );

        ReadinessResult {
            score: round_one_decimal(readiness),
            color: zone.color(),
            status: zone.status().to_string(),
            breakdown: ReadinessBreakdown {
                hrv_today,
                hrv_base,
                hrv_s,
                rhr_today,
                rhr_base,
                rhr_s,
                sleep_today: sleep_today / SECONDS_PER_HOUR,
                sleep_target,
                sleep_s,
                final_score: readiness,
            },
        }
    }

    /// Terms that made up the composite behind a breakdown
    ///
    /// Metrics without a sub-score are left out, so the weights of the
    /// returned terms sum to the divisor of the composite.
    pub fn weighted_terms(&self, breakdown: &ReadinessBreakdown) -> Vec<WeightedTerm> {
        self.terms(breakdown.hrv_s, breakdown.rhr_s, breakdown.sleep_s)
    }

    fn terms(&self, hrv_s: f64, rhr_s: f64, sleep_s: f64) -> Vec<WeightedTerm> {
        [
            ("HRV", hrv_s, self.config.hrv_weight),
            ("Resting HR", rhr_s, self.config.rhr_weight),
            ("Sleep", sleep_s, self.config.sleep_weight),
        ]
        .into_iter()
        .filter(|(_, sub_score, _)| *sub_score > 0.0)
        .map(|(metric, sub_score, weight)| WeightedTerm {
            metric,
            sub_score,
            contribution: self.diminishing_returns(sub_score),
            weight,
        })
        .collect()
    }

    /// Mean of the samples, or 0 when there are too few to be reliable
    fn baseline(&self, samples: impl Iterator<Item = f64>) -> f64 {
        let samples: Vec<f64> = samples.collect();
        if samples.is_empty() || samples.len() < self.config.min_baseline_samples {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Clamped sub-score, 0 unless both today's value and the baseline are positive
    fn sub_score(&self, today: f64, baseline: f64, raw: f64) -> f64 {
        if today > 0.0 && baseline > 0.0 {
            self.clamp_sub_score(raw)
        } else {
            0.0
        }
    }

    fn clamp_sub_score(&self, raw: f64) -> f64 {
        raw.max(0.0).min(self.config.sub_score_cap)
    }

    /// Smooth a (clamped) sub-score above the saturation point
    fn diminishing_returns(&self, sub_score: f64) -> f64 {
        let saturation = self.config.saturation_point;
        if sub_score <= saturation {
            sub_score
        } else {
            saturation + (sub_score - saturation) * self.config.diminishing_factor
        }
    }
}

/// Calculate readiness with the default configuration
pub fn calculate_readiness(series: &[WellnessRecord]) -> ReadinessResult {
    ReadinessCalculator::new().calculate(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(day: u32, hrv: Option<f64>, rhr: Option<f64>, sleep_secs: Option<f64>) -> WellnessRecord {
        WellnessRecord {
            hrv,
            resting_hr: rhr,
            sleep_secs,
            ..WellnessRecord::new(format!("2024-09-{:02}", day))
        }
    }

    fn steady_series(days: u32) -> Vec<WellnessRecord> {
        (1..=days)
            .map(|day| record(day, Some(50.0), Some(50.0), Some(28800.0)))
            .collect()
    }

    #[test]
    fn test_empty_series() {
        let result = calculate_readiness(&[]);

        assert_eq!(result.score, 0.0);
        assert_eq!(result.color, ReadinessColor::Red);
        assert_eq!(result.status, "Very low readiness (rest or full recovery)");
        assert_eq!(result.breakdown, ReadinessBreakdown::default());
    }

    #[test]
    fn test_steady_series_scores_100() {
        let result = calculate_readiness(&steady_series(3));

        assert_eq!(result.breakdown.hrv_s, 100.0);
        assert_eq!(result.breakdown.rhr_s, 100.0);
        assert_eq!(result.breakdown.sleep_s, 100.0);
        assert_eq!(result.breakdown.final_score, 100.0);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.color, ReadinessColor::Green);
        assert_eq!(result.status, "High readiness (train hard)");
        assert_eq!(result.breakdown.sleep_today, 8.0);
        assert_eq!(result.breakdown.sleep_target, 8.0);
    }

    #[test]
    fn test_too_few_hrv_samples_gives_no_baseline() {
        let series = vec![
            record(1, None, Some(50.0), Some(28800.0)),
            record(2, Some(60.0), Some(50.0), Some(28800.0)),
            record(3, Some(90.0), Some(50.0), Some(28800.0)),
        ];

        let result = calculate_readiness(&series);

        assert_eq!(result.breakdown.hrv_today, 90.0);
        assert_eq!(result.breakdown.hrv_base, 0.0);
        assert_eq!(result.breakdown.hrv_s, 0.0);
        // RHR and sleep still carry the score
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_no_metrics_is_insufficient_data() {
        let series: Vec<WellnessRecord> = (1..=5)
            .map(|day| record(day, None, Some(0.0), None))
            .collect();

        let result = calculate_readiness(&series);

        assert_eq!(result.score, 0.0);
        assert_eq!(result.color, ReadinessColor::Gray);
        assert_eq!(result.status, "Insufficient data for readiness calculation");
    }

    #[test]
    fn test_missing_today_value_drops_metric() {
        let mut series = steady_series(5);
        series[4].sleep_secs = None;

        let result = calculate_readiness(&series);

        // Sleep baseline still exists from previous nights
        assert_eq!(result.breakdown.sleep_target, 8.0);
        assert_eq!(result.breakdown.sleep_s, 0.0);
        assert_eq!(result.breakdown.sleep_today, 0.0);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_missing_metric_reweights_remaining() {
        // Baselines: HRV 50, sleep 8h; today HRV at baseline, sleep 6.4h (80%)
        let mut series: Vec<WellnessRecord> = (1..=4)
            .map(|day| record(day, Some(50.0), None, Some(8.0 * 3600.0)))
            .collect();
        series.push(record(5, Some(50.0), None, Some(6.4 * 3600.0)));

        let result = calculate_readiness(&series);

        assert_eq!(result.breakdown.rhr_s, 0.0);
        assert_eq!(result.breakdown.hrv_s, 100.0);
        let expected_sleep_s =
            100.0 * (6.4 * 3600.0 / 3600.0) / result.breakdown.sleep_target;
        assert!((result.breakdown.sleep_s - expected_sleep_s).abs() < 1e-9);

        let expected = (0.5 * 100.0 + 0.25 * expected_sleep_s) / 0.75;
        assert!((result.breakdown.final_score - expected).abs() < 1e-9);
        assert_eq!(result.color, ReadinessColor::LightGreen);
    }

    #[test]
    fn test_resting_hr_is_inverse() {
        let mut series = steady_series(9);
        series.push(record(10, Some(50.0), Some(60.0), Some(28800.0)));

        let result = calculate_readiness(&series);

        // Baseline 51, today 60 => 85
        assert!((result.breakdown.rhr_base - 51.0).abs() < 1e-9);
        assert!((result.breakdown.rhr_s - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_diminishing_returns() {
        let calculator = ReadinessCalculator::new();

        assert_eq!(calculator.diminishing_returns(130.0), 115.0);
        assert_eq!(calculator.diminishing_returns(100.0), 100.0);
        assert_eq!(calculator.diminishing_returns(80.0), 80.0);
        assert_eq!(calculator.diminishing_returns(150.0), 125.0);
    }

    #[test]
    fn test_sub_score_clamped_before_smoothing() {
        // HRV only: baseline of 3 x 20 and today 200 => mean 65, raw ~307 => clamp 150 => 125
        let series = vec![
            record(1, Some(20.0), None, None),
            record(2, Some(20.0), None, None),
            record(3, Some(20.0), None, None),
            record(4, Some(200.0), None, None),
        ];

        let result = calculate_readiness(&series);

        assert_eq!(result.breakdown.hrv_base, 65.0);
        assert_eq!(result.breakdown.hrv_s, 150.0);
        assert_eq!(result.score, 125.0);
        assert_eq!(result.color, ReadinessColor::Purple);
        assert_eq!(result.status, "Supercompensated (peak/race ready)");
    }

    #[test]
    fn test_window_limits_baseline() {
        // 40 old days at HRV 100 followed by 30 days at HRV 50
        let mut series: Vec<WellnessRecord> = (0..40)
            .map(|i| record(1 + (i % 28), Some(100.0), None, None))
            .collect();
        series.extend((0..30).map(|i| record(1 + (i % 28), Some(50.0), None, None)));

        let result = calculate_readiness(&series);

        assert_eq!(result.breakdown.hrv_base, 50.0);
        assert_eq!(result.breakdown.hrv_s, 100.0);
    }

    #[test]
    fn test_weighted_terms_skip_missing_metrics() {
        let series = vec![
            record(1, Some(27.0), None, Some(28800.0)),
            record(2, Some(27.0), None, Some(28800.0)),
            record(3, Some(27.0), None, Some(28800.0)),
            record(4, Some(39.0), None, Some(28800.0)),
        ];
        let calculator = ReadinessCalculator::new();
        let result = calculator.calculate(&series);

        let terms = calculator.weighted_terms(&result.breakdown);

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].metric, "HRV");
        assert_eq!(terms[0].sub_score, 130.0);
        assert_eq!(terms[0].contribution, 115.0);
        assert_eq!(terms[1].metric, "Sleep");
        assert_eq!(terms[1].contribution, 100.0);

        let total_weight: f64 = terms.iter().map(|t| t.weight).sum();
        let recomputed: f64 =
            terms.iter().map(|t| t.contribution * t.weight).sum::<f64>() / total_weight;
        assert_eq!(recomputed, result.breakdown.final_score);
        assert_eq!(result.score, 110.0);
    }

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(ReadinessZone::from_score(105.0), ReadinessZone::Supercompensated);
        assert_eq!(ReadinessZone::from_score(104.99), ReadinessZone::High);
        assert_eq!(ReadinessZone::from_score(95.0), ReadinessZone::High);
        assert_eq!(ReadinessZone::from_score(94.99), ReadinessZone::Good);
        assert_eq!(ReadinessZone::from_score(85.0), ReadinessZone::Good);
        assert_eq!(ReadinessZone::from_score(84.99), ReadinessZone::Moderate);
        assert_eq!(ReadinessZone::from_score(70.0), ReadinessZone::Moderate);
        assert_eq!(ReadinessZone::from_score(69.99), ReadinessZone::Low);
        assert_eq!(ReadinessZone::from_score(50.0), ReadinessZone::Low);
        assert_eq!(ReadinessZone::from_score(49.99), ReadinessZone::VeryLow);
        assert_eq!(ReadinessZone::from_score(0.0), ReadinessZone::VeryLow);
    }

    #[test]
    fn test_idempotent() {
        let mut series = steady_series(12);
        series.push(record(13, Some(57.3), Some(47.0), Some(25100.0)));

        let first = calculate_readiness(&series);
        let second = calculate_readiness(&series);

        assert_eq!(first, second);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
        assert_eq!(
            first.breakdown.final_score.to_bits(),
            second.breakdown.final_score.to_bits()
        );
    }

    #[test]
    fn test_custom_weights() {
        let config = ReadinessConfig {
            hrv_weight: 1.0,
            rhr_weight: 0.0,
            sleep_weight: 0.0,
            ..ReadinessConfig::default()
        };
        let mut series = steady_series(4);
        series.push(record(5, Some(40.0), Some(100.0), Some(3600.0)));

        let result = ReadinessCalculator::with_config(config).calculate(&series);

        // Only HRV counts: 40 / 48 * 100
        let expected = 100.0 * 40.0 / 48.0;
        assert!((result.breakdown.final_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_wire_names() {
        let json = serde_json::to_value(calculate_readiness(&steady_series(3))).unwrap();

        assert_eq!(json["color"], "green");
        assert_eq!(json["breakdown"]["HRV_s"], 100.0);
        assert_eq!(json["breakdown"]["Sleep_today"], 8.0);
        assert_eq!(json["breakdown"]["finalScore"], 100.0);
        assert_eq!(serde_json::to_value(ReadinessColor::LightGreen).unwrap(), "lightgreen");
    }

    proptest! {
        #[test]
        fn test_hrv_sub_score_monotonic(
            baseline in 10.0f64..150.0,
            low in 0.1f64..300.0,
            delta in 0.0f64..100.0,
        ) {
            let calculator = ReadinessCalculator::new();
            let high = low + delta;

            let low_score = calculator.sub_score(low, baseline, 100.0 * low / baseline);
            let high_score = calculator.sub_score(high, baseline, 100.0 * high / baseline);

            prop_assert!(high_score >= low_score);
            prop_assert!(high_score <= 150.0);
        }

        #[test]
        fn test_score_never_negative(
            hrv in proptest::option::of(0.0f64..200.0),
            rhr in proptest::option::of(0.0f64..120.0),
            sleep in proptest::option::of(0.0f64..50000.0),
        ) {
            let mut series = steady_series(5);
            series.push(record(6, hrv, rhr, sleep));

            let result = calculate_readiness(&series);

            prop_assert!(result.score >= 0.0);
            prop_assert!(result.breakdown.final_score <= 125.0);
        }
    }
}
