//! Common test utilities for UI integration tests

use archiver_core::{
    ArchiveApi, ArchivedUrl, Error, PreviewLink, Result, Session, StaticSessionProvider, Version,
};
use archiver_ui::Dashboard;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const LIST: &str = "list_urls";
pub const SUBMIT: &str = "submit_url";
pub const VERSIONS: &str = "list_versions";
pub const PREVIEW: &str = "request_preview_link";
pub const SNAPSHOT: &str = "fetch_snapshot";

/// Scripted backend. Each operation can be made to fail or to block until released.
#[allow(dead_code)]
pub struct MockApi {
    pub urls: Mutex<Vec<ArchivedUrl>>,
    pub versions: Mutex<Vec<Version>>,
    pub preview_link: Mutex<Option<String>>,
    pub snapshot: Mutex<String>,
    failures: Mutex<HashMap<&'static str, String>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            urls: Mutex::new(Vec::new()),
            versions: Mutex::new(Vec::new()),
            preview_link: Mutex::new(Some("https://bucket.example/p?sig=1".to_string())),
            snapshot: Mutex::new("<h1>Archived</h1>".to_string()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }
}

#[allow(dead_code)]
impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `op` fail with a server error carrying `message`
    pub fn fail(&self, op: &'static str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, message.to_string());
    }

    /// Block `op` until the returned gate is notified
    pub fn gate(&self, op: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(op, gate.clone());
        gate
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    async fn enter(&self, op: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        let gate = self.gates.lock().unwrap().get(op).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.failures.lock().unwrap().get(op) {
            Some(message) => Err(Error::server(Some(500), message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ArchiveApi for MockApi {
    async fn list_urls(&self) -> Result<Vec<ArchivedUrl>> {
        self.enter(LIST).await?;
        Ok(self.urls.lock().unwrap().clone())
    }

    async fn submit_url(&self, url: &str) -> Result<()> {
        self.enter(SUBMIT).await?;
        self.urls.lock().unwrap().push(ArchivedUrl {
            url: url.to_string(),
            versions: Vec::new(),
        });
        Ok(())
    }

    async fn list_versions(&self, _url: &str) -> Result<Vec<Version>> {
        self.enter(VERSIONS).await?;
        Ok(self.versions.lock().unwrap().clone())
    }

    async fn request_preview_link(&self, _storage_path: &str) -> Result<PreviewLink> {
        self.enter(PREVIEW).await?;
        match self.preview_link.lock().unwrap().clone() {
            Some(link) if !link.is_empty() => Ok(PreviewLink::new(link)),
            _ => Err(Error::server(Some(200), "missing preview link")),
        }
    }

    async fn fetch_snapshot(&self, _link: &PreviewLink) -> Result<String> {
        self.enter(SNAPSHOT).await?;
        Ok(self.snapshot.lock().unwrap().clone())
    }
}

#[allow(dead_code)]
pub fn version(storage_path: &str, y: i32, m: u32, d: u32) -> Version {
    Version {
        timestamp: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().into(),
        storage_path: storage_path.to_string(),
    }
}

#[allow(dead_code)]
pub fn archived(url: &str, versions: Vec<Version>) -> ArchivedUrl {
    ArchivedUrl {
        url: url.to_string(),
        versions,
    }
}

/// A dashboard signed in as `alice`
#[allow(dead_code)]
pub fn dashboard(api: &Arc<MockApi>, redirect_delay: Duration) -> (Dashboard, Arc<StaticSessionProvider>) {
    let sessions = Arc::new(StaticSessionProvider::new(Session::new("alice", "id-token")));
    let dashboard = Dashboard::new(api.clone(), sessions.clone(), redirect_delay);
    (dashboard, sessions)
}

/// Poll `condition` until it holds, failing the test after two seconds
#[allow(dead_code)]
pub async fn wait_for<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
