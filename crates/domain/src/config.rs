//! Configuration management
//!
//! All knobs of the client live here so the loader in the client crate can
//! fill them from environment variables or a config file. Presence status
//! labels are deliberately configuration rather than hard-coded: the code
//! meanings are inferred from observed portal behavior, not documented.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Full client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub credentials: Credentials,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
}

/// Portal login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Upstream endpoint layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Identity-provider entry point for the SSO handshake
    pub login_url: String,
    /// URLs whose exact appearance signals a completed handshake
    pub portal_urls: Vec<String>,
    /// JSON API base, versioned by suffix (e.g. `https://.../api/v`)
    pub api_base: String,
    /// First API version to probe
    pub api_version: u32,
    /// Base URL of the widget host serving calendar data
    pub widget_base: String,
}

/// Limits on the SSO handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Maximum submit/redirect cycles before the flow is declared failed
    pub max_steps: usize,
    /// Maximum API versions probed after portal arrival
    pub max_api_version_probes: usize,
}

/// Fetch behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-HTTP-call timeout in seconds
    pub timeout_seconds: u64,
    /// Calendar window: how many weeks past the current one to request
    pub weeks_ahead: u32,
    /// Widget token validity window in seconds
    pub token_validity_seconds: u64,
}

/// Presence status-code → human label mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    pub labels: HashMap<i64, String>,
}

impl ClientConfig {
    /// Configuration with default endpoints for the given credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials { username: username.into(), password: password.into() },
            ..Self::default()
        }
    }

    /// Look up the label for a presence status code.
    pub fn presence_label(&self, code: i64) -> String {
        self.presence
            .labels
            .get(&code)
            .cloned()
            .unwrap_or_else(|| format!("Status {code}"))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials { username: String::new(), password: String::new() },
            endpoints: EndpointConfig::default(),
            auth: AuthConfig::default(),
            fetch: FetchConfig::default(),
            presence: PresenceConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_steps: constants::MAX_AUTH_STEPS,
            max_api_version_probes: constants::MAX_API_VERSION_PROBES,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: constants::DEFAULT_TIMEOUT_SECS,
            weeks_ahead: 1,
            token_validity_seconds: constants::TOKEN_VALIDITY_SECS,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            login_url: constants::DEFAULT_LOGIN_URL.to_string(),
            portal_urls: vec![
                constants::DEFAULT_PORTAL_URL.to_string(),
                // Upstream has been seen announcing the port explicitly
                "https://www.aula.dk:443/portal/".to_string(),
            ],
            api_base: constants::DEFAULT_API_BASE.to_string(),
            api_version: constants::DEFAULT_API_VERSION,
            widget_base: constants::DEFAULT_WIDGET_BASE.to_string(),
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        let labels = HashMap::from([
            (0, "Ikke kommet".to_string()),
            (1, "Syg".to_string()),
            (2, "Ferie/Fri".to_string()),
            (constants::PRESENCE_STATUS_PRESENT, "Til stede".to_string()),
            (4, "På tur".to_string()),
            (5, "Sover".to_string()),
            (constants::PRESENCE_STATUS_DEPARTED, "Gået".to_string()),
        ]);
        Self { labels }
    }
}
