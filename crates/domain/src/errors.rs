//! Error types used throughout the client
//!
//! The variants mirror the failure boundaries of the refresh pipeline:
//! authentication and identity errors abort a refresh, per-fetch errors are
//! collected and converted into missing data at the fetch boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Skoleport
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum ClientError {
    /// The SSO handshake did not reach the portal. Carries the submit/redirect
    /// step at which the flow gave up and the last URL seen, since upstream
    /// page drift is the primary source of breakage.
    #[error("Authentication failed at step {step} (last url: {last_url})")]
    Authentication { step: usize, last_url: String },

    /// An upstream HTML page did not contain a login form at all. Distinct
    /// from a form with no pre-filled fields, which is valid.
    #[error("Malformed upstream page: {0}")]
    MalformedPage(String),

    /// Two distinct children resolved to the same upstream internal id.
    /// Proceeding would make their data indistinguishable downstream, so this
    /// is a hard failure and must never be swallowed.
    #[error("Identity collision on internal id {internal_id}: {children:?}")]
    IdentityCollision { internal_id: String, children: Vec<String> },

    /// One login-level child id resolved to multiple institution profiles.
    /// Snapshot sections are keyed on the login id, so proceeding would let
    /// one institution's data silently overwrite the other's.
    #[error("Ambiguous identity for child {external_id}: institution profiles {internal_ids:?}")]
    AmbiguousIdentity { external_id: String, internal_ids: Vec<String> },

    /// A widget bearer token could not be minted.
    #[error("Token unavailable for widget {widget_id}: {reason}")]
    TokenUnavailable { widget_id: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether this error aborts a whole `refresh()` rather than being
    /// recorded as missing data for one child/kind.
    pub fn is_fatal_for_refresh(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::MalformedPage(_)
                | Self::IdentityCollision { .. }
                | Self::AmbiguousIdentity { .. }
        )
    }
}

/// Result type alias for Skoleport operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification_matches_propagation_policy() {
        let auth = ClientError::Authentication { step: 3, last_url: "https://x".into() };
        let page = ClientError::MalformedPage("no form".into());
        let collision = ClientError::IdentityCollision {
            internal_id: "42".into(),
            children: vec!["a".into(), "b".into()],
        };
        let ambiguous = ClientError::AmbiguousIdentity {
            external_id: "1001".into(),
            internal_ids: vec!["111".into(), "222".into()],
        };
        assert!(auth.is_fatal_for_refresh());
        assert!(page.is_fatal_for_refresh());
        assert!(collision.is_fatal_for_refresh());
        assert!(ambiguous.is_fatal_for_refresh());

        let token = ClientError::TokenUnavailable { widget_id: "0128".into(), reason: "500".into() };
        assert!(!token.is_fatal_for_refresh());
        assert!(!ClientError::Network("timeout".into()).is_fatal_for_refresh());
        assert!(!ClientError::Parse("bad json".into()).is_fatal_for_refresh());
    }

    #[test]
    fn messages_carry_diagnostics() {
        let err = ClientError::Authentication { step: 10, last_url: "https://idp/step9".into() };
        let text = err.to_string();
        assert!(text.contains("step 10"));
        assert!(text.contains("https://idp/step9"));
    }
}
