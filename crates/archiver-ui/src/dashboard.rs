//! Dashboard controller
//!
//! Owns the navigation state and the three view models, and runs the async
//! calls that move them between states. All results are applied through
//! [`Dashboard::apply`], which drops them when the view that issued the call
//! has since been unmounted.

use crate::lifecycle::MountId;
use crate::router::{NavState, Route};
use crate::views::{
    submission::SubmissionState, url_list::UrlListState, versions::VersionBrowserState,
};
use archiver_core::{ArchiveApi, Result, SessionProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything the pages render from
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Mounted view, `None` before the first navigation and after sign-out
    pub route: Option<Route>,
    pub nav: NavState,
    pub mount: MountId,
    pub url_list: UrlListState,
    pub submission: SubmissionState,
    pub versions: VersionBrowserState,
}

/// What a page request should do after [`Dashboard::enter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Render the requested view
    Render,
    /// The controller has moved on; show this view instead
    Redirect(Route),
}

#[derive(Clone)]
pub struct Dashboard {
    api: Arc<dyn ArchiveApi>,
    sessions: Arc<dyn SessionProvider>,
    redirect_delay: Duration,
    model: Arc<RwLock<Model>>,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn ArchiveApi>,
        sessions: Arc<dyn SessionProvider>,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            api,
            sessions,
            redirect_delay,
            model: Arc::new(RwLock::new(Model::default())),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionProvider> {
        &self.sessions
    }

    /// Point-in-time copy of the model
    pub async fn snapshot(&self) -> Model {
        self.model.read().await.clone()
    }

    /// Mount `route`, unmounting whatever was shown.
    ///
    /// Returns the handle of the fetch the view starts on mount, if any.
    pub async fn navigate(&self, route: Route, nav: NavState) -> Option<JoinHandle<()>> {
        self.navigate_from(None, route, nav).await
    }

    /// Navigate only if `expected` is still the current mount
    async fn navigate_from(
        &self,
        expected: Option<MountId>,
        route: Route,
        nav: NavState,
    ) -> Option<JoinHandle<()>> {
        let identity = self.sessions.identity().await;
        let mut model = self.model.write().await;
        if expected.is_some_and(|mount| mount != model.mount) {
            debug!("Skipping navigation to {:?}: view was unmounted", route);
            return None;
        }

        let mount = model.mount.next();
        model.mount = mount;
        model.route = Some(route);
        model.nav = nav;
        debug!("Mounted {:?} ({:?})", route, mount);

        match route {
            Route::UrlList => {
                model.url_list = UrlListState::loading(identity);
                Some(self.spawn_url_list(mount))
            }
            Route::Submit => {
                model.submission = SubmissionState::default();
                None
            }
            Route::Versions => {
                model.versions = VersionBrowserState::for_url(model.nav.url.clone());
                let url = model.nav.url.clone()?;
                Some(self.spawn_versions(mount, url))
            }
        }
    }

    /// Resolve a page request for `route`.
    ///
    /// A request for the mounted view renders it as is. Otherwise it mounts
    /// the view, unless `follow` is set: polling pages follow the controller
    /// to whatever view it has moved to.
    pub async fn enter(&self, route: Route, follow: bool) -> Entry {
        let identity = self.sessions.identity().await;
        let (current, list_identity) = {
            let model = self.model.read().await;
            (model.route, model.url_list.identity.clone())
        };

        match current {
            Some(current) if current == route => {
                if route == Route::UrlList && list_identity != identity {
                    info!("Identity changed, reloading URL list");
                    self.navigate(route, NavState::default()).await;
                }
                Entry::Render
            }
            Some(current) if follow => Entry::Redirect(current),
            _ => {
                self.navigate(route, NavState::default()).await;
                Entry::Render
            }
        }
    }

    /// Submit the form's URL.
    ///
    /// Blank input sets the validation failure and returns `None` without
    /// calling the API. On success the form is cleared and, after the
    /// redirect delay, the URL list is mounted if the form still is.
    pub async fn submit(&self, input: &str) -> Option<JoinHandle<()>> {
        let mut model = self.model.write().await;
        if model.route != Some(Route::Submit) {
            return None;
        }
        let url = model.submission.begin(input)?;
        let mount = model.mount;
        drop(model);

        let this = self.clone();
        Some(tokio::spawn(async move {
            let result = this.api.submit_url(&url).await;
            if let Err(e) = &result {
                warn!("Submitting {} failed: {}", url, e);
            }
            let succeeded = result.is_ok();
            if !this.apply(mount, |m| m.submission.resolve(result)).await || !succeeded {
                return;
            }

            info!("Submitted {} for archiving", url);
            tokio::time::sleep(this.redirect_delay).await;
            this.navigate_from(Some(mount), Route::UrlList, NavState::default())
                .await;
        }))
    }

    /// Preview one version of the browsed URL.
    ///
    /// Returns `None` (the request is ignored) while another preview is in
    /// flight, or if the path is not in the loaded version list.
    pub async fn request_preview(&self, storage_path: &str) -> Option<JoinHandle<()>> {
        let mut model = self.model.write().await;
        if model.route != Some(Route::Versions) {
            return None;
        }
        if !model.versions.begin_preview(storage_path) {
            debug!("Ignoring preview request for {}", storage_path);
            return None;
        }
        let mount = model.mount;
        drop(model);

        let this = self.clone();
        let storage_path = storage_path.to_string();
        Some(tokio::spawn(async move {
            let result = this.load_preview(&storage_path).await;
            if let Err(e) = &result {
                warn!("Preview of {} failed: {}", storage_path, e);
            }
            this.apply(mount, |m| m.versions.resolve_preview(result)).await;
        }))
    }

    /// Destroy the session and unmount everything
    pub async fn sign_out(&self) -> Result<()> {
        self.sessions.sign_out().await?;
        let mut model = self.model.write().await;
        let mount = model.mount.next();
        *model = Model {
            mount,
            ..Model::default()
        };
        Ok(())
    }

    async fn load_preview(&self, storage_path: &str) -> Result<String> {
        let link = self.api.request_preview_link(storage_path).await?;
        self.api.fetch_snapshot(&link).await
    }

    fn spawn_url_list(&self, mount: MountId) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.api.list_urls().await;
            if let Err(e) = &result {
                warn!("Loading URLs failed: {}", e);
            }
            this.apply(mount, |m| m.url_list.resolve(result)).await;
        })
    }

    fn spawn_versions(&self, mount: MountId, url: String) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.api.list_versions(&url).await;
            if let Err(e) = &result {
                warn!("Loading versions of {} failed: {}", url, e);
            }
            this.apply(mount, |m| m.versions.resolve_versions(result))
                .await;
        })
    }

    /// Apply an async result if `mount` is still current. Returns whether it was applied.
    async fn apply(&self, mount: MountId, update: impl FnOnce(&mut Model)) -> bool {
        let mut model = self.model.write().await;
        if model.mount != mount {
            debug!("Discarding result for unmounted view ({:?})", mount);
            return false;
        }
        update(&mut model);
        true
    }
}
