//! Upstream JSON endpoints: wire shapes and per-child fetchers

pub mod calendar;
pub mod messages;
pub mod presence;
pub mod wire;

pub use calendar::CalendarFetcher;
pub use messages::MessagesFetcher;
pub use presence::PresenceFetcher;
