//! Sign-in form and sign-out

use super::{render, see};
use crate::AppState;
use crate::error::UiError;
use crate::router::{NavState, Route};
use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    username: String,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
}

/// Sign-in form, shown in place of any page while signed out
pub fn login_page(username: &str, error: Option<String>) -> Result<Response, UiError> {
    let status = if error.is_some() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::OK
    };
    let page = render(&LoginTemplate {
        username: username.to_string(),
        error,
    })?;
    Ok((status, page).into_response())
}

pub async fn sign_in(
    State(state): State<AppState>,
    Form(form): Form<SignInForm>,
) -> Result<Response, UiError> {
    let username = form.username.trim();
    match state
        .dashboard
        .sessions()
        .sign_in(username, &form.password)
        .await
    {
        Ok(session) => {
            info!("Signed in as {}", session.username);
            state
                .dashboard
                .navigate(Route::UrlList, NavState::default())
                .await;
            Ok(see(Route::UrlList))
        }
        Err(e) => {
            warn!("Sign-in for {} failed: {}", username, e);
            login_page(username, Some(e.to_string()))
        }
    }
}

/// Destroy the session and go back to the entry route
pub async fn sign_out(State(state): State<AppState>) -> Result<Response, UiError> {
    state.dashboard.sign_out().await?;
    info!("Signed out");
    Ok(Redirect::to("/").into_response())
}
