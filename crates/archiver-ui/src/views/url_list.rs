//! URL list view: `Loading -> Loaded | Failed`

use super::LoadState;
use archiver_core::{ArchivedUrl, types::format_capture_date};

pub const EMPTY_MESSAGE: &str =
    "You haven't added any URLs for archiving yet. Click \"Add New Link\" to get started!";
pub const NO_CAPTURE: &str = "N/A";
const LOAD_CONTEXT: &str = "Failed to load URLs";

/// One rendered row of the URL table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRow {
    pub url: String,
    /// Date of the most recent capture, or "N/A"
    pub last_archived: String,
    pub version_count: usize,
    /// "View (N)" when there is something to browse, otherwise "No versions"
    pub view_label: String,
    /// Safe to render as an outbound link (http or https)
    pub external: bool,
}

impl From<&ArchivedUrl> for UrlRow {
    fn from(item: &ArchivedUrl) -> Self {
        let version_count = item.versions.len();
        Self {
            url: item.url.clone(),
            last_archived: item
                .latest()
                .map(|v| format_capture_date(&v.timestamp))
                .unwrap_or_else(|| NO_CAPTURE.to_string()),
            version_count,
            view_label: if version_count > 0 {
                format!("View ({})", version_count)
            } else {
                "No versions".to_string()
            },
            external: is_web_url(&item.url),
        }
    }
}

fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlListState {
    pub load: LoadState<Vec<ArchivedUrl>>,
    /// Identity the list was fetched for; a different sign-in reloads it
    pub identity: Option<String>,
}

impl Default for UrlListState {
    fn default() -> Self {
        Self::loading(None)
    }
}

impl UrlListState {
    pub fn loading(identity: Option<String>) -> Self {
        Self {
            load: LoadState::Loading,
            identity,
        }
    }

    pub fn resolve(&mut self, result: archiver_core::Result<Vec<ArchivedUrl>>) {
        self.load = LoadState::settle(result, LOAD_CONTEXT);
    }

    pub fn rows(&self) -> Vec<UrlRow> {
        self.load
            .loaded()
            .map(|urls| urls.iter().map(UrlRow::from).collect())
            .unwrap_or_default()
    }

    /// Loaded with nothing to show
    pub fn is_empty(&self) -> bool {
        self.load.loaded().is_some_and(|urls| urls.is_empty())
    }
}
