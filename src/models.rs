use serde::{Deserialize, Serialize};

/// Seconds in an hour, used for all sleep conversions
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// One day of wellness data as returned by the intervals.icu wellness endpoint
///
/// Records are keyed by an opaque date string (`YYYY-MM-DD` from the API) and
/// a series is expected oldest first, with the last element being "today".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellnessRecord {
    /// Date key of the record
    pub id: String,

    /// Heart rate variability in milliseconds
    pub hrv: Option<f64>,

    /// Resting heart rate in beats per minute
    #[serde(rename = "restingHR")]
    pub resting_hr: Option<f64>,

    /// Sleep duration in seconds
    #[serde(rename = "sleepSecs")]
    pub sleep_secs: Option<f64>,

    /// Chronic Training Load (fitness)
    pub ctl: Option<f64>,

    /// Acute Training Load (fatigue)
    pub atl: Option<f64>,

    /// CTL ramp rate reported by the API
    #[serde(rename = "rampRate", default, skip_serializing_if = "Option::is_none")]
    pub ramp_rate: Option<f64>,

    /// Body weight in kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Sleep score from the wearable
    #[serde(rename = "sleepScore", default, skip_serializing_if = "Option::is_none")]
    pub sleep_score: Option<f64>,

    /// Subjective sleep quality
    #[serde(rename = "sleepQuality", default, skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<f64>,

    /// Average heart rate while asleep
    #[serde(rename = "avgSleepingHR", default, skip_serializing_if = "Option::is_none")]
    pub avg_sleeping_hr: Option<f64>,

    /// Daily step count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<f64>,

    /// Readiness as reported by the wearable vendor (not computed here)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<f64>,
}

impl WellnessRecord {
    /// Create an empty record for the given date key
    pub fn new(id: impl Into<String>) -> Self {
        WellnessRecord {
            id: id.into(),
            ..WellnessRecord::default()
        }
    }

    /// HRV if it was actually recorded (present and positive)
    pub fn recorded_hrv(&self) -> Option<f64> {
        recorded(self.hrv)
    }

    /// Resting HR if it was actually recorded (present and positive)
    pub fn recorded_resting_hr(&self) -> Option<f64> {
        recorded(self.resting_hr)
    }

    /// Sleep in hours if it was actually recorded (present and positive)
    pub fn recorded_sleep_hours(&self) -> Option<f64> {
        recorded(self.sleep_secs).map(|secs| secs / SECONDS_PER_HOUR)
    }
}

fn recorded(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

/// A completed activity from the intervals.icu activities endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,

    pub name: String,

    /// Activity type as reported by the API ("Run", "Ride", "Swim", ...)
    #[serde(rename = "type")]
    pub activity_type: String,

    /// Local start time as an ISO-8601 string
    pub start_date_local: String,

    /// Moving time in seconds
    pub moving_time: f64,

    /// Distance in meters
    pub distance: f64,

    /// Average speed in meters per second
    #[serde(default)]
    pub average_speed: Option<f64>,

    #[serde(default)]
    pub average_heartrate: Option<f64>,

    #[serde(default)]
    pub average_power: Option<f64>,

    /// Elevation gain in meters
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,

    #[serde(default)]
    pub calories: Option<f64>,
}

/// Trailing `len` elements of a chronological series
pub(crate) fn trailing<T>(series: &[T], len: usize) -> &[T] {
    &series[series.len().saturating_sub(len)..]
}

/// Round to one decimal place, halves rounded up toward positive infinity
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wellness_deserialization() {
        let json = r#"{
            "id": "2024-09-23",
            "ctl": 45.2,
            "atl": 52.8,
            "rampRate": 1.4,
            "restingHR": 48,
            "hrv": 62.5,
            "sleepSecs": 27000,
            "avgSleepingHR": null,
            "menstrualPhase": null,
            "locked": false
        }"#;

        let record: WellnessRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "2024-09-23");
        assert_eq!(record.resting_hr, Some(48.0));
        assert_eq!(record.sleep_secs, Some(27000.0));
        assert_eq!(record.ramp_rate, Some(1.4));
        assert_eq!(record.avg_sleeping_hr, None);
        assert_eq!(record.weight, None);
    }

    #[test]
    fn test_missing_fields_are_none() {
        let record: WellnessRecord = serde_json::from_str(r#"{"id": "2024-09-23"}"#).unwrap();
        assert_eq!(record, WellnessRecord::new("2024-09-23"));
    }

    #[test]
    fn test_recorded_values_ignore_non_positive() {
        let record = WellnessRecord {
            hrv: Some(0.0),
            resting_hr: Some(-1.0),
            sleep_secs: Some(28800.0),
            ..WellnessRecord::new("2024-09-23")
        };

        assert_eq!(record.recorded_hrv(), None);
        assert_eq!(record.recorded_resting_hr(), None);
        assert_eq!(record.recorded_sleep_hours(), Some(8.0));
    }

    #[test]
    fn test_activity_deserialization() {
        let json = r#"{
            "id": "i12345",
            "name": "Morning Ride",
            "type": "Ride",
            "start_date_local": "2024-09-23T07:30:00",
            "moving_time": 5400,
            "distance": 42000.5,
            "average_heartrate": 138
        }"#;

        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.activity_type, "Ride");
        assert_eq!(activity.moving_time, 5400.0);
        assert_eq!(activity.average_heartrate, Some(138.0));
        assert_eq!(activity.average_power, None);
    }

    #[test]
    fn test_trailing_window() {
        let series = [1, 2, 3, 4, 5];
        assert_eq!(trailing(&series, 3), &[3, 4, 5]);
        assert_eq!(trailing(&series, 10), &series);
        assert!(trailing::<i32>(&[], 3).is_empty());
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(97.26), 97.3);
        assert_eq!(round_one_decimal(20.0), 20.0);
        assert_eq!(round_one_decimal(-2.25), -2.2);
        assert_eq!(round_one_decimal(0.04), 0.0);
    }
}
