//! intervals.icu API client
//!
//! Thin async wrapper over the athlete endpoints the dashboard needs. Every
//! request uses HTTP Basic auth with the literal username `API_KEY` and the
//! athlete's API key as password. Failures are mapped to [`ApiError`] and
//! returned as-is; nothing is retried or cached.

use chrono::{Days, NaiveDate, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::config::ApiSettings;
use crate::credentials::{Credentials, CredentialsProvider};
use crate::error::{ApiError, ReadyRsError};
use crate::models::{Activity, WellnessRecord};

/// Basic auth username expected by intervals.icu
const BASIC_AUTH_USER: &str = "API_KEY";

/// Activities look-back window in days
const ACTIVITY_LOOKBACK_DAYS: u64 = 30;

/// Client for one athlete's intervals.icu data
#[derive(Debug, Clone)]
pub struct IntervalsClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    default_range_days: u32,
}

impl IntervalsClient {
    /// Build a client for the given credentials
    pub fn new(settings: &ApiSettings, credentials: Credentials) -> Result<Self, ApiError> {
        if !credentials.is_complete() {
            return Err(ApiError::NoCredentials);
        }

        // Validate the base URL up front so request errors are about the request
        Url::parse(&settings.base_url)?;

        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(IntervalsClient {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credentials,
            default_range_days: settings.default_range_days,
        })
    }

    /// Build a client from whatever the provider has stored
    pub fn from_provider(
        settings: &ApiSettings,
        provider: &dyn CredentialsProvider,
    ) -> Result<Self, ReadyRsError> {
        let credentials = provider.get()?.ok_or(ApiError::NoCredentials)?;
        Ok(Self::new(settings, credentials)?)
    }

    pub fn athlete_id(&self) -> &str {
        &self.credentials.athlete_id
    }

    /// `{base}/athlete/{id}/{endpoint}` with query parameters appended
    fn endpoint_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut raw = format!("{}/athlete/{}", self.base_url, self.credentials.athlete_id);
        if !endpoint.is_empty() {
            raw.push('/');
            raw.push_str(endpoint);
        }

        let mut url = Url::parse(&raw)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Authenticated GET returning decoded JSON
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint_url(endpoint, params)?;
        tracing::debug!(url = %url, "Calling intervals.icu API");

        let response = self
            .http
            .get(url)
            .basic_auth(BASIC_AUTH_USER, Some(&self.credentials.api_key))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "API response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "intervals.icu request failed");
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Resolve an optional date range against today
    ///
    /// `newest` defaults to today and `oldest` to `default_range_days` before today.
    pub fn wellness_range(
        &self,
        oldest: Option<NaiveDate>,
        newest: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<(NaiveDate, NaiveDate), ApiError> {
        let newest = newest.unwrap_or(today);
        let oldest = match oldest {
            Some(date) => date,
            None => today
                .checked_sub_days(Days::new(self.default_range_days as u64))
                .unwrap_or(today),
        };

        if oldest > newest {
            return Err(ApiError::InvalidParameters(format!(
                "oldest ({}) must not be after newest ({})",
                oldest, newest
            )));
        }
        Ok((oldest, newest))
    }

    /// Wellness records for a date range, oldest first as returned by the API
    pub async fn get_wellness(
        &self,
        oldest: Option<NaiveDate>,
        newest: Option<NaiveDate>,
    ) -> Result<Vec<WellnessRecord>, ApiError> {
        let (oldest, newest) = self.wellness_range(oldest, newest, Utc::now().date_naive())?;

        let records: Vec<WellnessRecord> = self
            .get_json(
                "wellness",
                &[
                    ("oldest", oldest.format("%Y-%m-%d").to_string()),
                    ("newest", newest.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        tracing::info!(records = records.len(), %oldest, %newest, "Fetched wellness data");
        Ok(records)
    }

    /// Latest wellness record in the default range
    pub async fn get_most_recent_wellness(&self) -> Result<Option<WellnessRecord>, ApiError> {
        Ok(self.get_wellness(None, None).await?.pop())
    }

    /// Activities from the last 30 days, at most `limit`
    pub async fn get_recent_activities(&self, limit: u32) -> Result<Vec<Activity>, ApiError> {
        let today = Utc::now().date_naive();
        let oldest = today
            .checked_sub_days(Days::new(ACTIVITY_LOOKBACK_DAYS))
            .unwrap_or(today);

        let activities: Vec<Activity> = self
            .get_json(
                "activities",
                &[
                    ("oldest", oldest.format("%Y-%m-%d").to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        tracing::info!(activities = activities.len(), "Fetched activities");
        Ok(activities)
    }

    pub async fn get_most_recent_activity(&self) -> Result<Option<Activity>, ApiError> {
        Ok(self.get_recent_activities(1).await?.into_iter().next())
    }

    /// Check the credentials against the athlete endpoint
    pub async fn test_credentials(&self) -> Result<bool, ApiError> {
        match self.get_json::<serde_json::Value>("", &[]).await {
            Ok(_) => Ok(true),
            Err(e @ ApiError::Transport(_)) => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Credentials test failed");
                Ok(false)
            }
        }
    }
}
