//! Short-lived widget bearer tokens
//!
//! Third-party widgets (the EasyIQ weekplan among them) authenticate with
//! bearer tokens minted by the portal API per widget id. Upstream treats
//! them as valid for about a minute, so the cache reuses a token within
//! that window and mints a fresh one afterwards. Concurrent fetches for
//! the same widget may race to mint; last writer wins and every caller
//! still holds a valid token.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;
use skoleport_domain::{ClientError, Result};
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::wire::ApiEnvelope;
use crate::http::HttpClient;

struct CachedToken {
    value: String,
    minted_at: Instant,
}

/// Per-widget token cache over the authenticated portal session.
pub struct WidgetTokenCache {
    http: Arc<HttpClient>,
    validity: Duration,
    entries: RwLock<HashMap<String, CachedToken>>,
}

impl WidgetTokenCache {
    pub fn new(http: Arc<HttpClient>, validity: Duration) -> Self {
        Self { http, validity, entries: RwLock::new(HashMap::new()) }
    }

    /// Return a `Bearer ...` authorization value for the widget, minting a
    /// fresh token when no cached one is within the validity window.
    ///
    /// # Errors
    /// [`ClientError::TokenUnavailable`] when the mint endpoint rejects the
    /// request or returns an unusable payload.
    pub async fn bearer_token(&self, api_url: &str, widget_id: &str) -> Result<String> {
        {
            let entries = self.entries.read().await;
            if let Some(cached) = entries.get(widget_id) {
                if cached.minted_at.elapsed() < self.validity {
                    return Ok(cached.value.clone());
                }
            }
        }

        let value = self.mint(api_url, widget_id).await?;
        debug!(widget_id, "minted widget token");

        let mut entries = self.entries.write().await;
        entries
            .insert(widget_id.to_string(), CachedToken { value: value.clone(), minted_at: Instant::now() });
        Ok(value)
    }

    /// Drop all cached tokens, e.g. after re-authentication.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn mint(&self, api_url: &str, widget_id: &str) -> Result<String> {
        let response = self
            .http
            .send(
                self.http
                    .request(Method::GET, api_url)
                    .query(&[("method", "aulaToken.getAulaToken"), ("widgetId", widget_id)]),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::TokenUnavailable {
                widget_id: widget_id.to_string(),
                reason: format!("mint endpoint returned status {status}"),
            });
        }

        let envelope: ApiEnvelope<String> =
            response.json().await.map_err(|err| ClientError::TokenUnavailable {
                widget_id: widget_id.to_string(),
                reason: format!("unusable token payload: {err}"),
            })?;

        if envelope.data.is_empty() {
            return Err(ClientError::TokenUnavailable {
                widget_id: widget_id.to_string(),
                reason: "empty token in payload".into(),
            });
        }

        Ok(format!("Bearer {}", envelope.data))
    }
}
