//! Display formatters for durations, distances and wellness values

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::SECONDS_PER_HOUR;

const NOT_AVAILABLE: &str = "N/A";

/// Format seconds as "1h 30m", or "45m" under an hour
pub fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds.max(0.0) / 60.0).floor() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format meters as "12.3 km", or "500 m" under a kilometer
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters.max(0.0))
    }
}

/// HRV in milliseconds, "N/A" when not recorded
pub fn format_hrv(hrv: Option<f64>) -> String {
    match hrv.filter(|v| *v > 0.0) {
        Some(value) => format!("{:.1} ms", value),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Resting heart rate in whole beats per minute
pub fn format_heart_rate(bpm: Option<f64>) -> String {
    match bpm.filter(|v| *v > 0.0) {
        Some(value) => format!("{:.0} bpm", value),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Sleep seconds as hours, e.g. "7.5 hrs"
pub fn format_sleep(sleep_secs: Option<f64>) -> String {
    match sleep_secs.filter(|v| *v > 0.0) {
        Some(secs) => format!("{:.1} hrs", secs / SECONDS_PER_HOUR),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// CTL/ATL/form with one decimal
pub fn format_training_load(load: Option<f64>) -> String {
    match load {
        Some(value) => format!("{:.1}", value),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Signed form value, e.g. "+4.2" or "-12.0"
pub fn format_form(form: f64) -> String {
    format!("{:+.1}", form)
}

/// Percentage with one decimal
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Turn an API date or local timestamp into "Mon, Sep 23"
///
/// Anything that does not parse is returned unchanged.
pub fn format_date(raw: &str) -> String {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%a, %b %-d").to_string();
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return timestamp.format("%a, %b %-d %H:%M").to_string();
    }
    raw.to_string()
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}' (expected YYYY-MM-DD): {}", raw, e))
}
