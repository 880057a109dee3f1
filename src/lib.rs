// Library interface for readyrs modules
// The scoring engines are pure; the client and credential store are the only I/O

pub mod client;
pub mod config;
pub mod credentials;
pub mod display;
pub mod error;
pub mod form;
pub mod format;
pub mod logging;
pub mod models;
pub mod readiness;
pub mod trends;

// Re-export commonly used types for convenience
pub use models::*;
pub use readiness::{
    calculate_readiness, ReadinessBreakdown, ReadinessCalculator, ReadinessColor, ReadinessConfig,
    ReadinessResult, ReadinessZone, WeightedTerm,
};
pub use form::{calculate_form, FormCalculator, FormColor, FormConfig, FormResult, FormTrendPoint, FormZone};
pub use trends::{metric_trends, MetricPoint, MetricSeries, MetricTrends};
pub use client::IntervalsClient;
pub use credentials::{Credentials, CredentialsProvider, FileCredentialStore, MemoryCredentialStore};
pub use config::{ApiSettings, AppConfig};
pub use error::{ApiError, ReadyRsError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
