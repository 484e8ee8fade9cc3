//! Authentication: form scraping, the SSO handshake, and widget tokens

pub mod form;
pub mod session;
pub mod tokens;

pub use form::LoginForm;
pub use session::{AuthOutcome, SessionAuthenticator};
pub use tokens::WidgetTokenCache;
