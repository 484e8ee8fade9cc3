//! HTTP plumbing shared by the authenticator and the fetchers

mod client;

pub use client::{HttpClient, HttpClientBuilder};
