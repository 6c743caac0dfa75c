//! Archiver Web UI
//!
//! Locally served dashboard for the archive backend. The three views (URL
//! list, submission form, version browser) are state machines owned by a
//! single [`Dashboard`] controller; the axum server renders whichever view is
//! mounted. HTML templates and CSS are compiled into the binary.

pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod router;
pub mod server;
pub mod views;

pub use dashboard::{Dashboard, Entry, Model};
pub use error::UiError;
pub use router::{NavState, Route};
pub use server::{UiConfig, UiServer};

/// Shared application state for the UI server
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
    pub config: UiConfig,
}
