//! Daily attendance via `presence.getDailyOverview`
//!
//! The endpoint takes institution profile ids and returns one entry per
//! child enrolled in an institution with attendance tracking; children
//! without it simply have no entry.

use std::sync::Arc;

use reqwest::Method;
use skoleport_domain::{ChildIdentity, ClientConfig, ClientError, PresenceOverview, Result};
use tracing::debug;

use super::wire::{ApiEnvelope, RawPresenceEntry};
use crate::http::HttpClient;

pub struct PresenceFetcher {
    http: Arc<HttpClient>,
    config: Arc<ClientConfig>,
}

impl PresenceFetcher {
    pub fn new(http: Arc<HttpClient>, config: Arc<ClientConfig>) -> Self {
        Self { http, config }
    }

    /// Fetch today's attendance for one child. `Ok(None)` means the child's
    /// institution does not track presence.
    pub async fn fetch(
        &self,
        api_url: &str,
        child: &ChildIdentity,
    ) -> Result<Option<PresenceOverview>> {
        let response = self
            .http
            .send(self.http.request(Method::GET, api_url).query(&[
                ("method", "presence.getDailyOverview"),
                ("childIds[]", child.internal_id.as_str()),
            ]))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Network(format!(
                "presence endpoint returned status {status} for child {}",
                child.external_id
            )));
        }

        let envelope: ApiEnvelope<Vec<RawPresenceEntry>> = response
            .json()
            .await
            .map_err(|err| ClientError::Parse(format!("presence payload invalid: {err}")))?;

        let entry = envelope
            .data
            .into_iter()
            .find(|entry| entry.institution_profile.id.as_string() == child.internal_id);

        let Some(entry) = entry else {
            debug!(child = %child.external_id, "no presence entry for child");
            return Ok(None);
        };

        Ok(Some(PresenceOverview {
            status_code: entry.status,
            status_label: self.config.presence_label(entry.status),
            check_in_time: entry.check_in_time,
            check_out_time: entry.check_out_time,
            entry_time: entry.entry_time,
            exit_time: entry.exit_time,
            comment: entry.comment,
            exit_with: entry.exit_with,
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn child(external: &str, internal: &str) -> ChildIdentity {
        ChildIdentity {
            external_id: external.into(),
            internal_id: internal.into(),
            display_name: "Alma".into(),
        }
    }

    fn fetcher() -> PresenceFetcher {
        let http = Arc::new(HttpClient::builder().max_attempts(1).build().expect("http client"));
        PresenceFetcher::new(http, Arc::new(ClientConfig::new("parent@example.com", "pw")))
    }

    #[tokio::test]
    async fn maps_status_code_to_configured_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v22"))
            .and(query_param("method", "presence.getDailyOverview"))
            .and(query_param("childIds[]", "4874248"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": {"code": 0},
                "data": [{
                    "institutionProfile": {"id": 4874248, "name": "Alma"},
                    "status": 8,
                    "checkInTime": "07:59:31",
                    "checkOutTime": "14:55:05",
                    "exitWith": "Mormor"
                }]
            })))
            .mount(&server)
            .await;

        let overview = fetcher()
            .fetch(&format!("{}/api/v22", server.uri()), &child("1001", "4874248"))
            .await
            .unwrap()
            .expect("entry");

        assert_eq!(overview.status_code, 8);
        assert_eq!(overview.status_label, "Gået");
        assert_eq!(overview.check_in_time.as_deref(), Some("07:59:31"));
        assert_eq!(overview.exit_with.as_deref(), Some("Mormor"));
    }

    #[tokio::test]
    async fn unknown_status_code_degrades_to_numeric_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v22"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"institutionProfile": {"id": 111}, "status": 42}]
            })))
            .mount(&server)
            .await;

        let overview = fetcher()
            .fetch(&format!("{}/api/v22", server.uri()), &child("1001", "111"))
            .await
            .unwrap()
            .expect("entry");
        assert_eq!(overview.status_label, "Status 42");
    }

    #[tokio::test]
    async fn missing_entry_means_presence_not_tracked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v22"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let overview = fetcher()
            .fetch(&format!("{}/api/v22", server.uri()), &child("1001", "111"))
            .await
            .unwrap();
        assert!(overview.is_none());
    }

    #[tokio::test]
    async fn entries_for_other_children_are_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v22"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"institutionProfile": {"id": 222}, "status": 3},
                    {"institutionProfile": {"id": 111}, "status": 1}
                ]
            })))
            .mount(&server)
            .await;

        let overview = fetcher()
            .fetch(&format!("{}/api/v22", server.uri()), &child("1001", "111"))
            .await
            .unwrap()
            .expect("entry");
        assert_eq!(overview.status_code, 1);
        assert_eq!(overview.status_label, "Syg");
    }
}
