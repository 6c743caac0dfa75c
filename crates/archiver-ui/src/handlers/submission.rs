//! Submission form handlers

use super::{PageQuery, Poll, auth::login_page, render, see, signed_in};
use crate::AppState;
use crate::dashboard::Entry;
use crate::error::UiError;
use crate::router::{NavState, Route};
use crate::views::submission::SubmitStatus;
use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

#[derive(Template)]
#[template(path = "add_url.html")]
struct AddUrlTemplate {
    poll: Option<Poll>,
    url_input: String,
    busy: bool,
    succeeded: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub url: String,
}

pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, UiError> {
    if !signed_in(&state).await {
        return login_page("", None);
    }
    if let Entry::Redirect(route) = state.dashboard.enter(Route::Submit, query.follow).await {
        return Ok(see(route));
    }

    let model = state.dashboard.snapshot().await;
    let form = &model.submission;
    let busy = form.is_busy();
    let succeeded = form.status == SubmitStatus::Succeeded;
    render(&AddUrlTemplate {
        // keep polling after success so the page follows the delayed redirect
        poll: Poll::when(busy || succeeded, &state, Route::Submit),
        url_input: form.url_input.clone(),
        busy,
        succeeded,
        error: form.error().map(str::to_string),
    })
}

pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Result<Response, UiError> {
    if !signed_in(&state).await {
        return login_page("", None);
    }
    if state.dashboard.snapshot().await.route != Some(Route::Submit) {
        state
            .dashboard
            .navigate(Route::Submit, NavState::default())
            .await;
    }
    state.dashboard.submit(&form.url).await;
    Ok(see(Route::Submit))
}

/// Leave the form, discarding its input
pub async fn cancel(State(state): State<AppState>) -> Result<Response, UiError> {
    if signed_in(&state).await {
        state
            .dashboard
            .navigate(Route::UrlList, NavState::default())
            .await;
    }
    Ok(see(Route::UrlList))
}
