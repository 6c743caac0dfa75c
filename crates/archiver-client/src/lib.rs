//! Archiver API Client
//!
//! This crate talks to the managed backend:
//! - Archive API client (list, submit, versions, preview link, snapshot download)
//! - Cognito user-pool session provider with silent refresh

pub mod api;
pub mod client;
pub mod cognito;
pub mod token_cache;

pub use api::{ApiConfig, ArchiverClient};
pub use client::HttpClientConfig;
pub use cognito::{CognitoConfig, CognitoSessionProvider};
