use crate::models::{round_one_decimal, trailing, WellnessRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Form engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Number of trailing records considered for the trend (default: 30)
    pub trend_days: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig { trend_days: 30 }
    }
}

/// Form color indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormColor {
    Yellow,
    Blue,
    Gray,
    Green,
    Red,
}

impl FormColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormColor::Yellow => "yellow",
            FormColor::Blue => "blue",
            FormColor::Gray => "gray",
            FormColor::Green => "green",
            FormColor::Red => "red",
        }
    }
}

impl fmt::Display for FormColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form (CTL - ATL) zones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormZone {
    Transition, // above +5
    Fresh,      // 0 to +5
    GreyZone,   // -10 to 0
    Optimal,    // -30 to -10
    HighRisk,   // below -30
}

impl FormZone {
    /// Classify a form value, first match wins
    pub fn classify(form: f64) -> Self {
        if form > 5.0 {
            FormZone::Transition
        } else if form >= 0.0 {
            FormZone::Fresh
        } else if form >= -10.0 {
            FormZone::GreyZone
        } else if form >= -30.0 {
            FormZone::Optimal
        } else {
            FormZone::HighRisk
        }
    }

    pub fn color(&self) -> FormColor {
        match self {
            FormZone::Transition => FormColor::Yellow,
            FormZone::Fresh => FormColor::Blue,
            FormZone::GreyZone => FormColor::Gray,
            FormZone::Optimal => FormColor::Green,
            FormZone::HighRisk => FormColor::Red,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormZone::Transition => "Transition / Fresh",
            FormZone::Fresh => "Fresh",
            FormZone::GreyZone => "Grey Zone",
            FormZone::Optimal => "Optimal",
            FormZone::HighRisk => "High Risk",
        }
    }

    pub fn meaning(&self) -> &'static str {
        match self {
            FormZone::Transition => {
                "Low load/taper; very fresh but may lose fitness if sustained; ideal before races"
            }
            FormZone::Fresh => "Well-recovered; ideal for high-intensity/key workouts",
            FormZone::GreyZone => "Maintenance; balanced fatigue/fitness; progress may stagnate",
            FormZone::Optimal => "Productive load; good stress–recovery balance",
            FormZone::HighRisk => "Excessive fatigue; recovery/deload required",
        }
    }
}

/// One day of the form trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTrendPoint {
    pub date: String,
    pub form: f64,
    pub ctl: f64,
    pub atl: f64,
}

/// Form engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResult {
    /// CTL - ATL of the latest record, rounded to one decimal
    pub form: f64,
    pub color: FormColor,
    pub zone: String,
    pub meaning: String,
    pub trend: Vec<FormTrendPoint>,
}

impl FormResult {
    /// Result for a series with no records at all
    pub fn no_data() -> Self {
        FormResult {
            form: 0.0,
            color: FormColor::Gray,
            zone: "No Data".to_string(),
            meaning: "Insufficient data to calculate form".to_string(),
            trend: Vec::new(),
        }
    }
}

/// Form calculation engine
#[derive(Debug, Clone, Default)]
pub struct FormCalculator {
    config: FormConfig,
}

impl FormCalculator {
    pub fn new() -> Self {
        FormCalculator {
            config: FormConfig::default(),
        }
    }

    pub fn with_config(config: FormConfig) -> Self {
        FormCalculator { config }
    }

    /// Current form and trend for a chronological series
    pub fn calculate(&self, series: &[WellnessRecord]) -> FormResult {
        let Some(today) = series.last() else {
            return FormResult::no_data();
        };

        let current_ctl = today.ctl.unwrap_or(0.0);
        let current_atl = today.atl.unwrap_or(0.0);
        let current_form = current_ctl - current_atl;

        let trend = self.trend(series);
        let zone = FormZone::classify(current_form);

        tracing::debug!(
            day = %today.id,
            ctl = current_ctl,
            atl = current_atl,
            form = current_form,
            trend_points = trend.len(),
            "Form calculated"
        );

        FormResult {
            form: round_one_decimal(current_form),
            color: zone.color(),
            zone: zone.label().to_string(),
            meaning: zone.meaning().to_string(),
            trend,
        }
    }

    /// Trailing records that carry both CTL and ATL, in input order
    pub fn trend(&self, series: &[WellnessRecord]) -> Vec<FormTrendPoint> {
        trailing(series, self.config.trend_days)
            .iter()
            .filter_map(|record| match (record.ctl, record.atl) {
                (Some(ctl), Some(atl)) => Some(FormTrendPoint {
                    date: record.id.clone(),
                    form: ctl - atl,
                    ctl,
                    atl,
                }),
                _ => None,
            })
            .collect()
    }
}

/// Calculate form with the default configuration
pub fn calculate_form(series: &[WellnessRecord]) -> FormResult {
    FormCalculator::new().calculate(series)
}
