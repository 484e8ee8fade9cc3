//! Domain constants
//!
//! Centralized location for the upstream discriminators and limits used
//! throughout the client. The item-type codes and widget id come from
//! observed upstream behavior; they are not documented by the portal.

// Upstream event stream discriminators. One calendar endpoint returns both
// scheduled classes and homework; `itemType` is the only thing telling them
// apart.
pub const ITEM_TYPE_WEEKPLAN: i64 = 9;
pub const ITEM_TYPE_HOMEWORK: i64 = 4;

// Widget addressing
pub const WEEKPLAN_WIDGET_ID: &str = "0128";

// Token cache
pub const TOKEN_VALIDITY_SECS: u64 = 60;

// Authentication flow limits
pub const MAX_AUTH_STEPS: usize = 10;
pub const MAX_API_VERSION_PROBES: usize = 8;

// Default endpoints
pub const DEFAULT_LOGIN_URL: &str = "https://login.aula.dk/auth/login.php";
pub const DEFAULT_PORTAL_URL: &str = "https://www.aula.dk/portal/";
pub const DEFAULT_API_BASE: &str = "https://www.aula.dk/api/v";
pub const DEFAULT_API_VERSION: u32 = 22;
pub const DEFAULT_WIDGET_BASE: &str = "https://skoleportal.easyiqcloud.dk";

// Credential override field names submitted during the SSO form walk
pub const FIELD_USERNAME: &str = "username";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_ACTOR: &str = "selected-aktoer";
pub const ACTOR_GUARDIAN: &str = "KONTAKT";
pub const FIELD_IDP: &str = "selectedIdp";
pub const IDP_UNILOGIN: &str = "uni_idp";

// Presence status codes observed upstream (meanings inferred, not documented)
pub const PRESENCE_STATUS_PRESENT: i64 = 3;
pub const PRESENCE_STATUS_DEPARTED: i64 = 8;

// HTTP defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/112.0";
