//! Archive API trait definitions

use crate::{
    Result,
    types::{ArchivedUrl, PreviewLink, Version},
};

/// The four backend operations plus the raw snapshot download.
///
/// Each call obtains a fresh token from the session provider; nothing is
/// retried, and the first failure is returned to the caller.
#[async_trait::async_trait]
pub trait ArchiveApi: Send + Sync {
    /// List the caller's archived URLs
    async fn list_urls(&self) -> Result<Vec<ArchivedUrl>>;

    /// Submit a URL for archiving. Blank input fails with `Error::Validation`
    /// before any request is made.
    async fn submit_url(&self, url: &str) -> Result<()>;

    /// List the captures of one URL
    async fn list_versions(&self, url: &str) -> Result<Vec<Version>>;

    /// Ask the backend for a presigned link to one capture
    async fn request_preview_link(&self, storage_path: &str) -> Result<PreviewLink>;

    /// Download the raw HTML behind a preview link
    async fn fetch_snapshot(&self, link: &PreviewLink) -> Result<String>;
}
