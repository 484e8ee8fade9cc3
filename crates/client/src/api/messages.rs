//! Inbox summary via the messaging thread listing
//!
//! Messages are account-level, not per-child. Only the first page of
//! threads is requested; the summary is an unread count plus the newest
//! thread for notification-style display, not a full mailbox sync.

use std::sync::Arc;

use reqwest::Method;
use skoleport_domain::{ClientError, LatestMessage, MessagesSummary, Result};
use tracing::debug;

use super::wire::{ApiEnvelope, ThreadsPayload};
use crate::http::HttpClient;

pub struct MessagesFetcher {
    http: Arc<HttpClient>,
}

impl MessagesFetcher {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch the inbox summary from the first page of threads.
    pub async fn fetch(&self, api_url: &str) -> Result<MessagesSummary> {
        let response = self
            .http
            .send(self.http.request(Method::GET, api_url).query(&[
                ("method", "messaging.getThreads"),
                ("sortOn", "date"),
                ("orderDirection", "desc"),
                ("page", "0"),
            ]))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Network(format!(
                "threads endpoint returned status {status}"
            )));
        }

        let envelope: ApiEnvelope<ThreadsPayload> = response
            .json()
            .await
            .map_err(|err| ClientError::Parse(format!("threads payload invalid: {err}")))?;

        let threads = envelope.data.threads;
        let unread_count =
            threads.iter().filter(|t| t.read == Some(false)).count() as u32;

        // Threads arrive newest-first
        let latest = threads.first().map(|thread| LatestMessage {
            subject: thread.subject.clone().unwrap_or_default(),
            text: thread
                .latest_message
                .as_ref()
                .and_then(|m| m.text.clone())
                .unwrap_or_default(),
            sender: thread
                .creator
                .as_ref()
                .and_then(|c| c.full_name.clone())
                .unwrap_or_default(),
        });

        debug!(unread_count, "inbox summary fetched");
        Ok(MessagesSummary { unread_count, latest })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fetcher() -> MessagesFetcher {
        MessagesFetcher::new(Arc::new(
            HttpClient::builder().max_attempts(1).build().expect("http client"),
        ))
    }

    #[tokio::test]
    async fn counts_unread_and_picks_newest_thread() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v22"))
            .and(query_param("method", "messaging.getThreads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": {"code": 0},
                "data": {"threads": [
                    {"subject": "Forældremøde", "read": false,
                     "latestMessage": {"text": "Husk tilmelding"},
                     "creator": {"fullName": "Klasselærer Hansen"}},
                    {"subject": "Madplan", "read": true,
                     "latestMessage": {"text": "Ny madplan"},
                     "creator": {"fullName": "Kontoret"}},
                    {"subject": "Lejrskole", "read": false,
                     "latestMessage": {"text": "Pakkeliste"},
                     "creator": {"fullName": "Klasselærer Hansen"}}
                ]}
            })))
            .mount(&server)
            .await;

        let summary = fetcher().fetch(&format!("{}/api/v22", server.uri())).await.unwrap();

        assert_eq!(summary.unread_count, 2);
        let latest = summary.latest.expect("latest thread");
        assert_eq!(latest.subject, "Forældremøde");
        assert_eq!(latest.text, "Husk tilmelding");
        assert_eq!(latest.sender, "Klasselærer Hansen");
    }

    #[tokio::test]
    async fn empty_inbox_yields_default_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v22"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"threads": []}})))
            .mount(&server)
            .await;

        let summary = fetcher().fetch(&format!("{}/api/v22", server.uri())).await.unwrap();
        assert_eq!(summary.unread_count, 0);
        assert!(summary.latest.is_none());
    }

    #[tokio::test]
    async fn sparse_thread_fields_do_not_fail_the_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v22"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"threads": [{"read": false}]}
            })))
            .mount(&server)
            .await;

        let summary = fetcher().fetch(&format!("{}/api/v22", server.uri())).await.unwrap();
        assert_eq!(summary.unread_count, 1);
        let latest = summary.latest.expect("latest thread");
        assert_eq!(latest.subject, "");
        assert_eq!(latest.sender, "");
    }

    #[tokio::test]
    async fn server_rejection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v22"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = fetcher().fetch(&format!("{}/api/v22", server.uri())).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
