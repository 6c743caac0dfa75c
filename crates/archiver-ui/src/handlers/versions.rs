//! Version browser handlers
//!
//! The browsed URL arrives in a form body and is kept by the controller;
//! it never appears in the page address.

use super::{PageQuery, Poll, auth::login_page, render, see, signed_in};
use crate::AppState;
use crate::dashboard::Entry;
use crate::error::UiError;
use crate::router::{NavState, Route};
use crate::views::versions::{
    EMPTY_MESSAGE, NO_URL_MESSAGE, PREVIEW_SANDBOX, PreviewState, VersionRow,
};
use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

#[derive(Template)]
#[template(path = "versions.html")]
struct VersionsTemplate {
    poll: Option<Poll>,
    url: Option<String>,
    notice: Option<&'static str>,
    loading: bool,
    error: Option<String>,
    rows: Vec<VersionRow>,
    preview_busy: bool,
    preview_html: Option<String>,
    preview_error: Option<String>,
    sandbox: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct OpenForm {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PreviewForm {
    pub storage_path: String,
}

pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, UiError> {
    if !signed_in(&state).await {
        return login_page("", None);
    }
    if let Entry::Redirect(route) = state.dashboard.enter(Route::Versions, query.follow).await {
        return Ok(see(route));
    }

    let model = state.dashboard.snapshot().await;
    let browser = &model.versions;
    let loading = browser.is_loading();
    let preview_busy = browser.preview.is_loading();
    let notice = if browser.url.is_none() {
        Some(NO_URL_MESSAGE)
    } else if browser.is_empty() {
        Some(EMPTY_MESSAGE)
    } else {
        None
    };
    let (preview_html, preview_error) = match &browser.preview {
        PreviewState::Shown { html, .. } => (Some(html.clone()), None),
        PreviewState::Failed { message, .. } => (None, Some(message.clone())),
        _ => (None, None),
    };

    render(&VersionsTemplate {
        poll: Poll::when(loading || preview_busy, &state, Route::Versions),
        url: browser.url.clone(),
        notice,
        loading,
        error: browser.error().map(str::to_string),
        rows: browser.rows(),
        preview_busy,
        preview_html,
        preview_error,
        sandbox: PREVIEW_SANDBOX,
    })
}

/// Open the browser for one URL, handed over from the URL list
pub async fn open(
    State(state): State<AppState>,
    Form(form): Form<OpenForm>,
) -> Result<Response, UiError> {
    if signed_in(&state).await {
        state
            .dashboard
            .navigate(Route::Versions, NavState::with_url(form.url))
            .await;
    }
    Ok(see(Route::Versions))
}

pub async fn preview(
    State(state): State<AppState>,
    Form(form): Form<PreviewForm>,
) -> Result<Response, UiError> {
    if signed_in(&state).await {
        state.dashboard.request_preview(&form.storage_path).await;
    }
    Ok(see(Route::Versions))
}
