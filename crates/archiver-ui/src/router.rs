//! Navigation paths and the transient state carried between views

/// The three views of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    UrlList,
    Submit,
    Versions,
}

impl Route {
    /// Resolve a request path. The entry route and its aliases all land on the URL list.
    pub fn from_path(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" | "/dashboard" | "/login" | "/index.html" => Some(Route::UrlList),
            "/add-url" => Some(Route::Submit),
            "/versions" => Some(Route::Versions),
            _ => None,
        }
    }

    /// Canonical path of the view
    pub fn path(&self) -> &'static str {
        match self {
            Route::UrlList => "/dashboard",
            Route::Submit => "/add-url",
            Route::Versions => "/versions",
        }
    }
}

/// In-memory payload handed to the view being navigated to.
///
/// Only the version browser reads it; it is never encoded in the path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavState {
    pub url: Option<String>,
}

impl NavState {
    pub fn with_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            url: (!url.trim().is_empty()).then_some(url),
        }
    }
}
