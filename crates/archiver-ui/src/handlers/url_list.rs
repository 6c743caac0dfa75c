//! URL list page handler

use super::{PageQuery, Poll, auth::login_page, render, see, signed_in};
use crate::AppState;
use crate::dashboard::Entry;
use crate::error::UiError;
use crate::router::{NavState, Route};
use crate::views::url_list::{EMPTY_MESSAGE, UrlRow};
use askama::Template;
use axum::{
    extract::{Query, State},
    response::Response,
};

#[derive(Template)]
#[template(path = "url_list.html")]
struct UrlListTemplate {
    poll: Option<Poll>,
    identity: Option<String>,
    loading: bool,
    error: Option<String>,
    empty_message: Option<&'static str>,
    rows: Vec<UrlRow>,
}

pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, UiError> {
    if !signed_in(&state).await {
        return login_page("", None);
    }
    if let Entry::Redirect(route) = state.dashboard.enter(Route::UrlList, query.follow).await {
        return Ok(see(route));
    }

    let model = state.dashboard.snapshot().await;
    let list = &model.url_list;
    let loading = list.load.is_loading();
    render(&UrlListTemplate {
        poll: Poll::when(loading, &state, Route::UrlList),
        identity: list.identity.clone(),
        loading,
        error: list.load.error().map(str::to_string),
        empty_message: list.is_empty().then_some(EMPTY_MESSAGE),
        rows: list.rows(),
    })
}

/// Fetch the list again
pub async fn refresh(State(state): State<AppState>) -> Result<Response, UiError> {
    if signed_in(&state).await {
        state
            .dashboard
            .navigate(Route::UrlList, NavState::default())
            .await;
    }
    Ok(see(Route::UrlList))
}
