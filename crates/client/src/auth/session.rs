//! The multi-step SSO handshake
//!
//! The identity provider offers no token endpoint for guardians; the only
//! way in is the browser flow: fetch the login page, pick the identity
//! provider, then keep re-submitting whatever form the current page holds
//! (credentials merged in) until the portal URL appears — or a step budget
//! runs out. Upstream page structure is outside our control, so every
//! failure carries the step index and last-seen URL.
//!
//! State machine: `START → IDP_SELECTED → CREDENTIAL_SUBMITTED* →
//! PORTAL_REACHED | FAILED`. No partial state is retried; callers re-invoke
//! from the start.

use std::sync::Arc;

use reqwest::Method;
use skoleport_domain::{constants, AuthState, ClientConfig, ClientError, Result};
use tracing::{debug, info, warn};
use url::Url;

use super::form::LoginForm;
use crate::api::wire::{ApiEnvelope, ProfilesPayload, RawProfile};
use crate::http::HttpClient;

/// Successful handshake result
#[derive(Debug)]
pub struct AuthOutcome {
    /// Resolved versioned API base, e.g. `https://www.aula.dk/api/v22`
    pub api_url: String,
    /// Raw profile records for the identity resolver
    pub profiles: Vec<RawProfile>,
}

/// Drives the SSO handshake over a shared HTTP session.
///
/// The cookie jar inside [`HttpClient`] is the actual session state; this
/// type only tracks where the handshake got to.
pub struct SessionAuthenticator {
    http: Arc<HttpClient>,
    config: Arc<ClientConfig>,
    state: AuthState,
}

impl SessionAuthenticator {
    pub fn new(http: Arc<HttpClient>, config: Arc<ClientConfig>) -> Self {
        Self { http, config, state: AuthState::Unauthenticated }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Run the full handshake from the start.
    ///
    /// # Errors
    /// - [`ClientError::MalformedPage`] when the entry pages carry no form
    /// - [`ClientError::Authentication`] when the bounded submit loop ends
    ///   without reaching a portal URL, or the API probe is rejected
    pub async fn authenticate(&mut self) -> Result<AuthOutcome> {
        self.state = AuthState::Authenticating;

        match self.run_handshake().await {
            Ok(outcome) => {
                self.state = AuthState::Authenticated;
                info!(api_url = %outcome.api_url, "authentication complete");
                Ok(outcome)
            }
            Err(err) => {
                self.state = AuthState::Failed;
                Err(err)
            }
        }
    }

    /// Drop back to the unauthenticated state (e.g. after the upstream
    /// session expired server-side).
    pub fn reset(&mut self) {
        self.state = AuthState::Unauthenticated;
    }

    async fn run_handshake(&self) -> Result<AuthOutcome> {
        let (mut body, mut current_url) = self.select_identity_provider().await?;

        let credentials = &self.config.credentials;
        let overrides: [(&str, &str); 3] = [
            (constants::FIELD_USERNAME, credentials.username.as_str()),
            (constants::FIELD_PASSWORD, credentials.password.as_str()),
            (constants::FIELD_ACTOR, constants::ACTOR_GUARDIAN),
        ];

        let max_steps = self.config.auth.max_steps;
        for step in 0..max_steps {
            // A previous submit (or the IdP selection itself) may already
            // have landed on the portal.
            if self.portal_reached(&current_url) {
                debug!(step, url = %current_url, "portal reached");
                return self.probe_api().await;
            }

            let mut form = match LoginForm::parse(&body) {
                Ok(form) => form,
                Err(ClientError::MalformedPage(reason)) => {
                    warn!(step, url = %current_url, %reason, "no usable form mid-handshake");
                    return Err(ClientError::Authentication {
                        step,
                        last_url: current_url.to_string(),
                    });
                }
                Err(other) => return Err(other),
            };
            form.apply_overrides(&overrides);

            let action = resolve_action(&current_url, &form.action)?;
            debug!(step, action = %action, fields = form.fields.len(), "submitting handshake form");

            let response =
                self.http.send(self.http.request(Method::POST, action).form(&form.fields)).await?;

            current_url = response.url().clone();
            body = response
                .text()
                .await
                .map_err(|err| ClientError::Parse(format!("handshake page unreadable: {err}")))?;
        }

        if self.portal_reached(&current_url) {
            debug!(url = %current_url, "portal reached on final step");
            return self.probe_api().await;
        }
        Err(ClientError::Authentication { step: max_steps, last_url: current_url.to_string() })
    }

    /// Fetch the login page and submit the identity-provider selection.
    async fn select_identity_provider(&self) -> Result<(String, Url)> {
        let response = self
            .http
            .send(
                self.http
                    .request(Method::GET, &self.config.endpoints.login_url)
                    .query(&[("type", "unilogin")]),
            )
            .await?;

        let login_url = response.url().clone();
        if !response.status().is_success() {
            return Err(ClientError::Authentication { step: 0, last_url: login_url.to_string() });
        }
        let body = response
            .text()
            .await
            .map_err(|err| ClientError::Parse(format!("login page unreadable: {err}")))?;

        // The login page's only job is handing us the broker form target.
        let form = LoginForm::parse(&body)?;
        let action = resolve_action(&login_url, &form.action)?;

        debug!(action = %action, "selecting identity provider");
        let response = self
            .http
            .send(
                self.http
                    .request(Method::POST, action)
                    .form(&[(constants::FIELD_IDP, constants::IDP_UNILOGIN)]),
            )
            .await?;

        let current_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|err| ClientError::Parse(format!("broker page unreadable: {err}")))?;
        Ok((body, current_url))
    }

    /// Find the working API version and pull the login profiles.
    ///
    /// Upstream retires old versions with HTTP 410; the version number only
    /// ever moves forward, so probe upward from the configured baseline.
    async fn probe_api(&self) -> Result<AuthOutcome> {
        let endpoints = &self.config.endpoints;
        let mut version = endpoints.api_version;

        for _ in 0..self.config.auth.max_api_version_probes {
            let api_url = format!("{}{}", endpoints.api_base, version);
            let response = self
                .http
                .send(
                    self.http
                        .request(Method::GET, &api_url)
                        .query(&[("method", "profiles.getProfilesByLogin")]),
                )
                .await?;

            match response.status().as_u16() {
                410 => {
                    debug!(version, "API version retired, probing next");
                    version += 1;
                }
                403 => {
                    return Err(ClientError::Authentication {
                        step: self.config.auth.max_steps,
                        last_url: api_url,
                    });
                }
                200 => {
                    let envelope: ApiEnvelope<ProfilesPayload> =
                        response.json().await.map_err(|err| {
                            ClientError::Parse(format!("profiles payload invalid: {err}"))
                        })?;
                    return Ok(AuthOutcome { api_url, profiles: envelope.data.profiles });
                }
                status => {
                    return Err(ClientError::Network(format!(
                        "profiles endpoint {api_url} returned status {status}"
                    )));
                }
            }
        }

        Err(ClientError::Network(format!(
            "no working API version within {} probes from v{}",
            self.config.auth.max_api_version_probes, endpoints.api_version
        )))
    }

    fn portal_reached(&self, candidate: &Url) -> bool {
        self.config.endpoints.portal_urls.iter().any(|portal| urls_match(portal, candidate))
    }
}

/// Resolve a form action against the page it came from (actions are usually
/// absolute, but relative ones appear on some broker pages).
fn resolve_action(base: &Url, action: &str) -> Result<Url> {
    base.join(action)
        .map_err(|err| ClientError::MalformedPage(format!("unusable form action {action:?}: {err}")))
}

/// Exact-URL portal comparison, tolerant of explicit default ports
/// (`https://host:443/portal/` vs `https://host/portal/`).
fn urls_match(expected: &str, candidate: &Url) -> bool {
    match Url::parse(expected) {
        Ok(expected) => {
            expected.scheme() == candidate.scheme()
                && expected.host_str() == candidate.host_str()
                && expected.port_or_known_default() == candidate.port_or_known_default()
                && expected.path() == candidate.path()
        }
        Err(_) => expected == candidate.as_str(),
    }
}
