//! Web UI server implementation

use crate::AppState;
use crate::dashboard::Dashboard;
use crate::handlers;
use axum::{
    Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

/// UI server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Host to bind to (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on (default: 8090)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between page refreshes while a view is loading (default: 1)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Pause between a successful submission and the return to the URL list
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8090
}
fn default_poll_interval() -> u64 {
    1
}
fn default_redirect_delay() -> u64 {
    1500
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            poll_interval_secs: default_poll_interval(),
            redirect_delay_ms: default_redirect_delay(),
        }
    }
}

impl UiConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

/// UI Server
pub struct UiServer {
    config: UiConfig,
    dashboard: Dashboard,
}

impl UiServer {
    pub fn new(config: UiConfig, dashboard: Dashboard) -> Self {
        Self { config, dashboard }
    }

    /// Build the Axum router with all routes
    pub fn router(&self) -> Router {
        let state = AppState {
            dashboard: self.dashboard.clone(),
            config: self.config.clone(),
        };

        Router::new()
            // URL list, also the entry route
            .route("/", get(handlers::url_list::page))
            .route("/dashboard", get(handlers::url_list::page))
            .route("/index.html", get(handlers::url_list::page))
            .route("/dashboard/refresh", post(handlers::url_list::refresh))
            .route(
                "/login",
                get(handlers::url_list::page).post(handlers::auth::sign_in),
            )
            .route("/sign-out", post(handlers::auth::sign_out))
            // Submission form
            .route(
                "/add-url",
                get(handlers::submission::page).post(handlers::submission::submit),
            )
            .route("/add-url/cancel", post(handlers::submission::cancel))
            // Version browser
            .route(
                "/versions",
                get(handlers::versions::page).post(handlers::versions::open),
            )
            .route("/versions/preview", post(handlers::versions::preview))
            // Static assets (embedded in binary)
            .route("/static/css/style.css", get(handlers::static_files::serve_css))
            .route("/healthz", get(handlers::health::healthz))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the UI server
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

        let router = self.router();

        info!("Archiver dashboard starting on http://{}", addr);
        info!("   URL list:     http://{}/dashboard", addr);
        info!("   Add a URL:    http://{}/add-url", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
