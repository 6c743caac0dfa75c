//! Version browser view
//!
//! Two independent machines: the version list (`Loading -> Loaded | Failed`,
//! only when a URL was handed over) and the preview
//! (`Idle -> Loading -> Shown | Failed`).

use super::{LoadState, describe};
use archiver_core::{Version, types::format_capture_date};

pub const EMPTY_MESSAGE: &str = "No archived versions found for this URL.";
pub const NO_URL_MESSAGE: &str = "No URL selected. Pick one from the dashboard to browse its versions.";

/// Capabilities of the frame that renders snapshot HTML. Must not include
/// `allow-same-origin`: together with scripts it gives the snapshot access to
/// the dashboard page.
pub const PREVIEW_SANDBOX: &str = "allow-scripts allow-forms allow-popups";

const VERSIONS_CONTEXT: &str = "Failed to load versions";
const PREVIEW_CONTEXT: &str = "Failed to generate preview";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewState {
    #[default]
    Idle,
    Loading {
        storage_path: String,
    },
    Shown {
        storage_path: String,
        html: String,
    },
    Failed {
        storage_path: String,
        message: String,
    },
}

impl PreviewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, PreviewState::Loading { .. })
    }

    pub fn storage_path(&self) -> Option<&str> {
        match self {
            PreviewState::Idle => None,
            PreviewState::Loading { storage_path }
            | PreviewState::Shown { storage_path, .. }
            | PreviewState::Failed { storage_path, .. } => Some(storage_path.as_str()),
        }
    }
}

/// One rendered row of the versions table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRow {
    pub date: String,
    pub storage_path: String,
    /// This row is the one being (or last) previewed
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionBrowserState {
    pub url: Option<String>,
    /// `None` when no URL was handed over, so nothing is fetched
    pub versions: Option<LoadState<Vec<Version>>>,
    pub preview: PreviewState,
}

impl VersionBrowserState {
    pub fn for_url(url: Option<String>) -> Self {
        Self {
            versions: url.as_ref().map(|_| LoadState::Loading),
            url,
            preview: PreviewState::Idle,
        }
    }

    pub fn resolve_versions(&mut self, result: archiver_core::Result<Vec<Version>>) {
        self.versions = Some(LoadState::settle(result, VERSIONS_CONTEXT));
    }

    /// Start a preview of one listed version.
    ///
    /// Returns `false`, leaving state untouched, while another preview is in
    /// flight or when the path is not one of the loaded versions.
    pub fn begin_preview(&mut self, storage_path: &str) -> bool {
        if self.preview.is_loading() {
            return false;
        }
        let listed = self
            .versions
            .as_ref()
            .and_then(LoadState::loaded)
            .is_some_and(|versions| versions.iter().any(|v| v.storage_path == storage_path));
        if !listed {
            return false;
        }

        self.preview = PreviewState::Loading {
            storage_path: storage_path.to_string(),
        };
        true
    }

    pub fn resolve_preview(&mut self, result: archiver_core::Result<String>) {
        let storage_path = self.preview.storage_path().unwrap_or_default().to_string();
        self.preview = match result {
            Ok(html) => PreviewState::Shown { storage_path, html },
            Err(err) => PreviewState::Failed {
                storage_path,
                message: describe(PREVIEW_CONTEXT, &err),
            },
        };
    }

    pub fn rows(&self) -> Vec<VersionRow> {
        let selected = self.preview.storage_path();
        self.versions
            .as_ref()
            .and_then(LoadState::loaded)
            .map(|versions| {
                versions
                    .iter()
                    .map(|v| VersionRow {
                        date: format_capture_date(&v.timestamp),
                        storage_path: v.storage_path.clone(),
                        selected: selected == Some(v.storage_path.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.versions.as_ref().is_some_and(LoadState::is_loading)
    }

    pub fn is_empty(&self) -> bool {
        self.versions
            .as_ref()
            .and_then(LoadState::loaded)
            .is_some_and(|v| v.is_empty())
    }

    pub fn error(&self) -> Option<&str> {
        self.versions.as_ref().and_then(LoadState::error)
    }
}
