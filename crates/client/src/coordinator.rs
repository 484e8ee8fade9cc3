//! The refresh orchestrator
//!
//! One [`SkoleportClient`] owns one portal session (the cookie jar in its
//! HTTP client) and exposes a single aggregate operation: [`refresh`]
//! authenticates when needed, resolves the child list, fans out the
//! per-child fetches concurrently, and folds the results into a
//! [`Snapshot`].
//!
//! Error policy: failures that invalidate the whole snapshot
//! (authentication, identity resolution) propagate out of `refresh`;
//! per-fetch failures are recorded in [`Snapshot::errors`] while the
//! affected section keeps its previous value. A broken presence endpoint
//! must not take the weekplan down with it.
//!
//! [`refresh`]: SkoleportClient::refresh

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use skoleport_domain::{
    AuthState, ChildIdentity, ClientConfig, ClientError, DataKind, FetchFailure, Result, Snapshot,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::{CalendarFetcher, MessagesFetcher, PresenceFetcher};
use crate::auth::{SessionAuthenticator, WidgetTokenCache};
use crate::http::HttpClient;
use crate::identity::resolve_children;

struct Session {
    api_url: String,
    children: Vec<ChildIdentity>,
}

/// Everything tied to one HTTP client instance. Rebuilt wholesale by
/// [`SkoleportClient::close`] so the connection pool and cookie jar of a
/// closed session are actually dropped, not just forgotten about.
struct ClientState {
    tokens: Arc<WidgetTokenCache>,
    calendar: CalendarFetcher,
    presence: PresenceFetcher,
    messages: MessagesFetcher,
    authenticator: SessionAuthenticator,
    session: Option<Session>,
    previous: Snapshot,
}

impl ClientState {
    fn build(config: &Arc<ClientConfig>) -> Result<Self> {
        let http = Arc::new(
            HttpClient::builder()
                .timeout(Duration::from_secs(config.fetch.timeout_seconds))
                .build()?,
        );
        let tokens = Arc::new(WidgetTokenCache::new(
            http.clone(),
            Duration::from_secs(config.fetch.token_validity_seconds),
        ));

        Ok(Self {
            calendar: CalendarFetcher::new(http.clone(), config.clone(), tokens.clone()),
            presence: PresenceFetcher::new(http.clone(), config.clone()),
            messages: MessagesFetcher::new(http.clone()),
            authenticator: SessionAuthenticator::new(http, config.clone()),
            tokens,
            session: None,
            previous: Snapshot::empty(),
        })
    }
}

/// Async client for the school portal.
pub struct SkoleportClient {
    config: Arc<ClientConfig>,
    state: Mutex<ClientState>,
}

impl SkoleportClient {
    /// Build a client from configuration. No network traffic happens until
    /// the first [`refresh`](Self::refresh).
    pub fn new(config: ClientConfig) -> Result<Self> {
        let config = Arc::new(config);
        let state = ClientState::build(&config)?;
        Ok(Self { config, state: Mutex::new(state) })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn auth_state(&self) -> AuthState {
        self.state.lock().await.authenticator.state()
    }

    /// Authenticate if needed, fetch everything, and return the aggregate
    /// snapshot.
    ///
    /// # Errors
    /// Only session-level failures are raised: [`ClientError::Authentication`],
    /// [`ClientError::MalformedPage`], [`ClientError::IdentityCollision`],
    /// [`ClientError::AmbiguousIdentity`], and transport errors during the
    /// handshake itself. All per-fetch failures land in [`Snapshot::errors`]
    /// instead.
    pub async fn refresh(&self) -> Result<Snapshot> {
        let mut state = self.state.lock().await;

        if state.session.is_none() || !state.authenticator.is_authenticated() {
            let outcome = state.authenticator.authenticate().await?;
            let children = resolve_children(&outcome.profiles)?;
            // Widget tokens belong to the old session
            state.tokens.clear().await;
            info!(children = children.len(), api_url = %outcome.api_url, "portal session established");
            state.session = Some(Session { api_url: outcome.api_url, children });
        }

        let (api_url, children) = match &state.session {
            Some(session) => (session.api_url.clone(), session.children.clone()),
            None => {
                return Err(ClientError::Config(
                    "no session available after authentication".into(),
                ))
            }
        };

        let api_url_ref = api_url.as_str();
        let children_ref = &children;
        let calendar_fetcher = &state.calendar;
        let presence_fetcher = &state.presence;
        let child_fetches = children.iter().map(|child| async move {
            let (calendar, presence) = tokio::join!(
                calendar_fetcher.fetch(api_url_ref, child, children_ref),
                presence_fetcher.fetch(api_url_ref, child),
            );
            (child, calendar, presence)
        });
        let (per_child, messages_result) =
            tokio::join!(join_all(child_fetches), state.messages.fetch(&api_url));

        let mut snapshot = Snapshot {
            children: children.clone(),
            by_child: HashMap::new(),
            messages: state.previous.messages.clone(),
            errors: Vec::new(),
            fetched_at: Utc::now(),
        };

        for (child, calendar, presence) in per_child {
            // Start from the previous refresh so a failed section stays
            // stale-but-available instead of vanishing.
            let mut entry =
                state.previous.by_child.get(&child.external_id).cloned().unwrap_or_default();

            match calendar {
                Ok((weekplan, homework)) => {
                    entry.weekplan = Some(weekplan);
                    entry.homework = Some(homework);
                }
                Err(err) => {
                    warn!(child = %child.external_id, error = %err, "calendar fetch failed");
                    snapshot.errors.push(FetchFailure {
                        child: Some(child.external_id.clone()),
                        kind: DataKind::Calendar,
                        message: err.to_string(),
                    });
                }
            }

            match presence {
                Ok(Some(overview)) => entry.presence = Some(overview),
                Ok(None) => {}
                Err(err) => {
                    warn!(child = %child.external_id, error = %err, "presence fetch failed");
                    snapshot.errors.push(FetchFailure {
                        child: Some(child.external_id.clone()),
                        kind: DataKind::Presence,
                        message: err.to_string(),
                    });
                }
            }

            snapshot.by_child.insert(child.external_id.clone(), entry);
        }

        match messages_result {
            Ok(summary) => snapshot.messages = summary,
            Err(err) => {
                warn!(error = %err, "messages fetch failed");
                snapshot.errors.push(FetchFailure {
                    child: None,
                    kind: DataKind::Messages,
                    message: err.to_string(),
                });
            }
        }

        state.previous = snapshot.clone();
        Ok(snapshot)
    }

    /// Drop the portal session and everything attached to it: connection
    /// pool, cookie jar, cached widget tokens. The next
    /// [`refresh`](Self::refresh) authenticates from the start over a fresh
    /// HTTP client.
    pub async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        *state = ClientState::build(&self.config)?;
        info!("client session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn new_client_starts_unauthenticated_without_traffic() {
        let client = SkoleportClient::new(ClientConfig::new("parent@example.com", "pw")).unwrap();
        assert_eq!(client.auth_state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn auth_failure_propagates_out_of_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/login.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>no form here</html>"))
            .mount(&server)
            .await;

        let mut config = ClientConfig::new("parent@example.com", "pw");
        config.endpoints.login_url = format!("{}/auth/login.php", server.uri());
        let client = SkoleportClient::new(config).unwrap();

        let err = client.refresh().await.unwrap_err();
        assert!(err.is_fatal_for_refresh());
        assert_eq!(client.auth_state().await, AuthState::Failed);
    }

    #[tokio::test]
    async fn close_resets_to_unauthenticated() {
        let client = SkoleportClient::new(ClientConfig::new("parent@example.com", "pw")).unwrap();
        client.close().await.unwrap();
        assert_eq!(client.auth_state().await, AuthState::Unauthenticated);
    }
}
