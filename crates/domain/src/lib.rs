//! # Skoleport Domain
//!
//! Domain types and models for the Skoleport portal client.
//!
//! This crate contains:
//! - Domain data types (children, calendar events, presence, snapshots)
//! - The client error taxonomy and Result definitions
//! - Configuration structures
//! - Domain constants (upstream discriminators, endpoints, limits)
//!
//! ## Architecture
//! - No dependencies on other Skoleport crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
