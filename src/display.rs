//! Terminal rendering of readiness, form, wellness and activities
//!
//! Everything here returns a `String` so the CLI decides where it goes.

use colored::{ColoredString, Colorize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::form::{FormColor, FormResult, FormTrendPoint};
use crate::format::{
    format_date, format_distance, format_duration, format_form, format_heart_rate, format_hrv,
    format_percent, format_sleep, format_training_load,
};
use crate::models::{Activity, WellnessRecord};
use crate::readiness::{ReadinessCalculator, ReadinessColor, ReadinessConfig, ReadinessResult};
use crate::trends::{MetricSeries, MetricTrends};

/// Apply a readiness color to text
pub fn paint_readiness(text: &str, color: ReadinessColor) -> ColoredString {
    match color {
        ReadinessColor::Purple => text.magenta(),
        ReadinessColor::Green => text.green(),
        ReadinessColor::LightGreen => text.bright_green(),
        ReadinessColor::Yellow => text.yellow(),
        ReadinessColor::Orange => text.truecolor(255, 165, 0),
        ReadinessColor::Red => text.red(),
        ReadinessColor::Gray => text.bright_black(),
    }
}

/// Apply a form color to text
pub fn paint_form(text: &str, color: FormColor) -> ColoredString {
    match color {
        FormColor::Yellow => text.yellow(),
        FormColor::Blue => text.blue(),
        FormColor::Gray => text.bright_black(),
        FormColor::Green => text.green(),
        FormColor::Red => text.red(),
    }
}

/// Headline card for a readiness result
pub fn readiness_card(result: &ReadinessResult) -> String {
    let indicator = paint_readiness("●", result.color);
    let score = paint_readiness(&format_percent(result.score), result.color).bold();

    format!(
        "{}\n  {} {}\n  {}",
        "Readiness".bold(),
        indicator,
        score,
        result.status
    )
}

#[derive(Tabled)]
struct BreakdownRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Today")]
    today: String,
    #[tabled(rename = "Baseline")]
    baseline: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

/// Per-metric breakdown plus the weighted formula
pub fn readiness_breakdown(result: &ReadinessResult, config: &ReadinessConfig) -> String {
    let b = &result.breakdown;
    let rows = vec![
        BreakdownRow {
            metric: "HRV",
            today: format!("{:.1} ms", b.hrv_today),
            baseline: format!("{:.1} ms", b.hrv_base),
            score: format_percent(b.hrv_s),
            weight: format!("{:.2}", config.hrv_weight),
        },
        BreakdownRow {
            metric: "Resting HR",
            today: format!("{:.0} bpm", b.rhr_today),
            baseline: format!("{:.0} bpm", b.rhr_base),
            score: format_percent(b.rhr_s),
            weight: format!("{:.2}", config.rhr_weight),
        },
        BreakdownRow {
            metric: "Sleep",
            today: format!("{:.1} hrs", b.sleep_today),
            baseline: format!("{:.1} hrs", b.sleep_target),
            score: format_percent(b.sleep_s),
            weight: format!("{:.2}", config.sleep_weight),
        },
    ];

    let formula = readiness_formula(result, config);

    format!(
        "{}\n{}",
        Table::new(rows).with(Style::rounded()),
        formula.dimmed()
    )
}

/// Weighted mean of the available metrics, e.g. `(115.0 × 0.50 + 100.0 × 0.25) / 0.75 = 110.0%`
fn readiness_formula(result: &ReadinessResult, config: &ReadinessConfig) -> String {
    let terms = ReadinessCalculator::with_config(config.clone()).weighted_terms(&result.breakdown);
    if terms.is_empty() {
        return "No metrics available".to_string();
    }

    let total_weight: f64 = terms.iter().map(|t| t.weight).sum();
    let products = terms
        .iter()
        .map(|t| format!("{:.1} × {:.2}", t.contribution, t.weight))
        .collect::<Vec<_>>()
        .join(" + ");

    format!(
        "({}) / {:.2} = {}",
        products,
        total_weight,
        format_percent(result.breakdown.final_score)
    )
}

/// Headline card for a form result
pub fn form_card(result: &FormResult) -> String {
    let indicator = paint_form("●", result.color);
    let value = paint_form(&format_form(result.form), result.color).bold();

    format!(
        "{}\n  {} {} {}\n  {}",
        "Form".bold(),
        indicator,
        value,
        result.zone,
        result.meaning
    )
}

#[derive(Tabled)]
struct FormTrendRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Fitness (CTL)")]
    ctl: String,
    #[tabled(rename = "Fatigue (ATL)")]
    atl: String,
    #[tabled(rename = "Form")]
    form: String,
}

pub fn form_trend_table(trend: &[FormTrendPoint]) -> String {
    if trend.is_empty() {
        return "No form history available".dimmed().to_string();
    }

    let rows = trend.iter().map(|point| {
        let color = crate::form::FormZone::classify(point.form).color();
        FormTrendRow {
            date: format_date(&point.date),
            ctl: format_training_load(Some(point.ctl)),
            atl: format_training_load(Some(point.atl)),
            form: paint_form(&format_form(point.form), color).to_string(),
        }
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct TrendSummaryRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Average")]
    average: String,
    #[tabled(rename = "Days")]
    days: usize,
}

fn summary_row(metric: &'static str, series: &MetricSeries, unit: &str) -> TrendSummaryRow {
    let value = |v: Option<f64>| match v {
        Some(v) => format!("{:.1} {}", v, unit),
        None => "N/A".to_string(),
    };

    TrendSummaryRow {
        metric,
        latest: value(series.latest().map(|p| p.value)),
        min: value(series.recorded_min()),
        max: value(series.recorded_max()),
        average: value(series.recorded_mean()),
        days: series.len(),
    }
}

/// Min/max/average summary of each wellness metric
pub fn wellness_trends_table(trends: &MetricTrends) -> String {
    let rows = vec![
        summary_row("HRV", &trends.hrv, "ms"),
        summary_row("Resting HR", &trends.resting_hr, "bpm"),
        summary_row("Sleep", &trends.sleep_hours, "hrs"),
    ];

    Table::new(rows).with(Style::rounded()).to_string()
}

/// One line per day with a bar relative to the series range
pub fn sparkline(series: &MetricSeries, width: usize) -> String {
    let Some(min) = series.min() else {
        return String::new();
    };
    let range = series.range();

    series
        .points
        .iter()
        .map(|point| {
            let filled = (((point.value - min) / range) * width as f64).round() as usize;
            format!(
                "{:<12} {:<width$} {:.1}",
                point.date,
                "█".repeat(filled.min(width)),
                point.value,
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Details of a single wellness record
pub fn wellness_record_table(record: &WellnessRecord) -> String {
    let optional = |v: Option<f64>, precision: usize| match v {
        Some(v) => format!("{:.*}", precision, v),
        None => "N/A".to_string(),
    };

    let rows = vec![
        FieldRow { field: "Date", value: format_date(&record.id) },
        FieldRow { field: "HRV", value: format_hrv(record.hrv) },
        FieldRow { field: "Resting HR", value: format_heart_rate(record.resting_hr) },
        FieldRow { field: "Sleep", value: format_sleep(record.sleep_secs) },
        FieldRow { field: "Sleep score", value: optional(record.sleep_score, 0) },
        FieldRow { field: "Fitness (CTL)", value: format_training_load(record.ctl) },
        FieldRow { field: "Fatigue (ATL)", value: format_training_load(record.atl) },
        FieldRow { field: "Ramp rate", value: optional(record.ramp_rate, 1) },
        FieldRow { field: "Weight", value: optional(record.weight, 1) },
        FieldRow { field: "Steps", value: optional(record.steps, 0) },
    ];

    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    activity_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Avg HR")]
    heart_rate: String,
}

pub fn activities_table(activities: &[Activity]) -> String {
    if activities.is_empty() {
        return "No recent activities".dimmed().to_string();
    }

    let rows = activities.iter().map(|activity| ActivityRow {
        date: format_date(&activity.start_date_local),
        activity_type: activity.activity_type.clone(),
        name: activity.name.clone(),
        duration: format_duration(activity.moving_time),
        distance: format_distance(activity.distance),
        heart_rate: format_heart_rate(activity.average_heartrate),
    });

    Table::new(rows).with(Style::rounded()).to_string()
}
