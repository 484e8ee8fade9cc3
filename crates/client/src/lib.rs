//! # Skoleport Client
//!
//! Async client for the Aula/EasyIQ school portal.
//!
//! The portal exposes no token API for guardians; authentication is a
//! multi-step, form-scraping single-sign-on handshake, and the data
//! endpoints hang off short-lived per-widget bearer tokens. This crate
//! drives that pipeline and exposes exactly two things to a hosting
//! runtime: [`SkoleportClient::refresh`] returning an aggregate
//! [`skoleport_domain::Snapshot`], and [`SkoleportClient::close`].
//!
//! ## Layers
//! - [`http`] — reqwest wrapper with per-call timeout, bounded retry, and
//!   the cookie jar the SSO session lives in
//! - [`auth`] — form walker, session authenticator, widget token cache
//! - [`identity`] — child identity resolution with the injectivity check
//! - [`api`] — per-child calendar/presence/messages fetchers
//! - [`coordinator`] — the refresh orchestrator

pub mod api;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod http;
pub mod identity;

pub use coordinator::SkoleportClient;
