//! HTTP handlers for the UI server

pub mod auth;
pub mod health;
pub mod static_files;
pub mod submission;
pub mod url_list;
pub mod versions;

use crate::AppState;
use crate::error::UiError;
use crate::router::Route;
use askama::Template;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::warn;

/// Query string of a page request
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Set by the page's own refresh: follow the controller if it has moved on
    #[serde(default)]
    pub follow: bool,
}

/// Auto-refresh of a page that is waiting on the backend
pub struct Poll {
    pub seconds: u64,
    pub target: String,
}

impl Poll {
    pub fn when(waiting: bool, state: &AppState, route: Route) -> Option<Poll> {
        waiting.then(|| Poll {
            seconds: state.config.poll_interval_secs,
            target: format!("{}?follow=true", route.path()),
        })
    }
}

pub(crate) fn render(template: &impl Template) -> Result<Response, UiError> {
    Ok(Html(template.render()?).into_response())
}

/// Redirect after a form post
pub(crate) fn see(route: Route) -> Response {
    Redirect::to(route.path()).into_response()
}

/// Whether a usable session exists. Provider failures count as signed out.
pub(crate) async fn signed_in(state: &AppState) -> bool {
    match state.dashboard.sessions().session().await {
        Ok(session) => session.is_some(),
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            false
        }
    }
}
