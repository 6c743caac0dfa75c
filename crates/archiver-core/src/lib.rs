//! Archiver Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout the archiver:
//! - Archived URL, version and preview link types
//! - Session provider abstraction
//! - API trait implemented by the HTTP client
//! - Core error taxonomy

pub mod api;
pub mod error;
pub mod session;
pub mod types;

pub use api::ArchiveApi;
pub use error::{Error, Result};
pub use session::{Session, SessionProvider, StaticSessionProvider};
pub use types::{ArchivedUrl, CaptureTime, PreviewLink, Version};
