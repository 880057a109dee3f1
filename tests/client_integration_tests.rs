use mockito::Matcher;
use readyrs::credentials::{CredentialsProvider, FileCredentialStore};
use readyrs::{
    ApiError, ApiSettings, Credentials, FormCalculator, IntervalsClient, ReadinessCalculator,
    ReadinessColor, ReadyRsError,
};
use tempfile::tempdir;

/// Integration tests that fetch from a mock intervals.icu and score the result

#[cfg(test)]
mod client_integration_tests {
    use super::*;

    fn wellness_body(days: u32) -> String {
        let records: Vec<serde_json::Value> = (1..=days)
            .map(|day| {
                serde_json::json!({
                    "id": format!("2024-09-{:02}", day),
                    "hrv": 55.0,
                    "restingHR": 48,
                    "sleepSecs": 27000,
                    "ctl": 42.0,
                    "atl": 50.0,
                    "rampRate": 0.8,
                })
            })
            .collect();
        serde_json::to_string(&records).unwrap()
    }

    fn settings_for(server: &mockito::ServerGuard) -> ApiSettings {
        ApiSettings {
            base_url: server.url(),
            ..ApiSettings::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_and_score() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/athlete/i7/wellness")
            .match_query(Matcher::Any)
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(wellness_body(14))
            .create_async()
            .await;

        let client =
            IntervalsClient::new(&settings_for(&server), Credentials::new("key", "i7")).unwrap();
        let records = client.get_wellness(None, None).await.unwrap();
        mock.assert_async().await;

        let readiness = ReadinessCalculator::new().calculate(&records);
        assert_eq!(readiness.score, 100.0);
        assert_eq!(readiness.color, ReadinessColor::Green);

        let form = FormCalculator::new().calculate(&records);
        assert_eq!(form.form, -8.0);
        assert_eq!(form.zone, "Grey Zone");
        assert_eq!(form.trend.len(), 14);
    }

    #[tokio::test]
    async fn test_client_from_stored_credentials() {
        let dir = tempdir().unwrap();
        let mut store = FileCredentialStore::new(dir.path().join("credentials.toml"));

        let mut server = mockito::Server::new_async().await;
        let settings = settings_for(&server);

        let missing = IntervalsClient::from_provider(&settings, &store);
        assert!(matches!(missing, Err(ReadyRsError::Api(ApiError::NoCredentials))));

        store.set(Credentials::new("stored-key", "i9")).unwrap();
        let _mock = server
            .mock("GET", "/athlete/i9")
            .with_status(200)
            .with_body(r#"{"id": "i9"}"#)
            .create_async()
            .await;

        let client = IntervalsClient::from_provider(&settings, &store).unwrap();
        assert_eq!(client.athlete_id(), "i9");
        assert!(client.test_credentials().await.unwrap());
    }

    #[tokio::test]
    async fn test_unauthorized_user_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/athlete/i7/activities")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let client =
            IntervalsClient::new(&settings_for(&server), Credentials::new("bad", "i7")).unwrap();
        let err = ReadyRsError::from(client.get_recent_activities(5).await.unwrap_err());

        assert_eq!(
            err.user_message(),
            "Invalid API key or athlete ID. Please check your credentials."
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let settings = ApiSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..ApiSettings::default()
        };
        let client = IntervalsClient::new(&settings, Credentials::new("key", "i7")).unwrap();

        let err = client.test_credentials().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
