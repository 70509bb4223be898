// src/controller.rs

//! Owns every piece of client state: the media selection, the tab registry and
//! the single poller. Each user action maps to one method here.
//!
//! Failures never propagate as errors; they end up as an alert and/or a status
//! line, and the method reports whether the action went through.

use crate::{
    cli::Platform,
    client::{ApiClient, StatusSource},
    config::{AppConfig, file::save_download_folder},
    constants::messages,
    error::{AppError, AppResult},
    models::{DownloadStatus, api::StartDownloadRequest},
    poller::{Outcome, Poller, StatusListener},
    render::{RenderTarget, StatusView},
    selection::SelectionManager,
    tabs::{TabControls, TabRegistry},
    trigger::DownloadTrigger,
};
use futures::{StreamExt, stream};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

const TRIGGER_CONCURRENCY: usize = 3;

pub struct Controller<R: RenderTarget> {
    client: Arc<ApiClient>,
    view: Arc<dyn StatusView>,
    trigger: Arc<dyn DownloadTrigger>,
    poller: Poller,
    selection: SelectionManager<R>,
    tabs: Arc<Mutex<TabRegistry>>,
}

impl<R: RenderTarget> Controller<R> {
    pub fn new(
        config: &AppConfig,
        client: Arc<ApiClient>,
        renderer: R,
        view: Arc<dyn StatusView>,
        trigger: Arc<dyn DownloadTrigger>,
    ) -> Self {
        let tabs = Arc::new(Mutex::new(TabRegistry::new(config)));

        let tabs_for_titles = tabs.clone();
        let listener: StatusListener = Arc::new(move |status: &DownloadStatus| {
            if let Some(title) = status.title() {
                let filled = tabs_for_titles.lock().unwrap().fill_missing_titles(title);
                if !filled.is_empty() {
                    debug!("title '{}' copied to {:?}", title, filled);
                }
            }
        });

        let poller = Poller::with_listener(
            client.clone() as Arc<dyn StatusSource>,
            view.clone(),
            trigger.clone(),
            config.poll_interval,
            config.finish_delay,
            Some(listener),
        );

        Self {
            selection: SelectionManager::new(renderer, client.server()),
            client,
            view,
            trigger,
            poller,
            tabs,
        }
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn selection(&self) -> &SelectionManager<R> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager<R> {
        &mut self.selection
    }

    pub fn tabs(&self) -> MutexGuard<'_, TabRegistry> {
        self.tabs.lock().unwrap()
    }

    pub fn is_downloading(&self) -> bool {
        self.poller.is_downloading()
    }

    /// Waits until the running cycle finishes (including the file save).
    pub async fn wait_for_download(&self) -> Option<Outcome> {
        self.poller.wait().await
    }

    // --- Instagram picker ---

    /// Fetches the media of an Instagram post and renders one tile per item.
    /// A failed fetch leaves the current tiles as they are.
    pub async fn fetch_instagram_media(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            self.view.alert(messages::EMPTY_INSTAGRAM_URL);
            return false;
        }

        self.view.set_message(messages::FETCHING_MEDIA);
        match self.client.fetch_instagram_info(url).await {
            Ok(res) if res.success => {
                let count = res.media.len();
                info!("fetched {} media items from {}", count, url);
                self.selection.render(res.media);
                self.view.set_message(&format!("Found {} media items.", count));
                true
            }
            Ok(res) => {
                let msg = res.message.unwrap_or_else(|| "unknown error".to_string());
                warn!("media fetch refused for {}: {}", url, msg);
                self.view.alert(&format!("Error: {}", msg));
                self.view
                    .set_message(&format!("{}: {}", messages::FETCH_ERROR, msg));
                false
            }
            Err(e) => {
                error!("media fetch for {} failed: {}", url, e);
                self.view.alert("Failed to fetch media");
                self.view.set_message(messages::FETCH_ERROR);
                false
            }
        }
    }

    /// Downloads the checked tiles. Nothing is sent when none are checked.
    pub async fn download_selected(&mut self) -> bool {
        let urls = self.selection.get_selected();
        if urls.is_empty() {
            self.view.alert(messages::EMPTY_SELECTION);
            return false;
        }
        self.download_instagram_files(&urls).await
    }

    pub async fn download_all(&mut self) -> bool {
        if self.selection.is_empty() {
            self.view.alert(messages::NO_MEDIA);
            return false;
        }
        let urls = self.selection.get_all();
        self.download_instagram_files(&urls).await
    }

    /// Posts the chosen media URLs and, once accepted, follows the backend's progress.
    pub async fn download_instagram_files(&self, urls: &[String]) -> bool {
        if !self.enter_request() {
            return false;
        }
        let folder = self.tabs().controls(Platform::Instagram).folder.clone();

        self.view.set_message(messages::STARTING);
        match self.client.download_instagram_files(urls, &folder).await {
            Ok(res) if res.success => {
                info!("backend accepted {} media urls", urls.len());
                self.poller.start();
                true
            }
            Ok(res) => {
                self.poller.request_failed();
                self.view.alert(&format!("Error: {}", res.message_or("unknown error")));
                self.view.set_message(messages::DOWNLOAD_FAILED);
                false
            }
            Err(e) => {
                self.poller.request_failed();
                error!("media download request failed: {}", e);
                self.view.alert(messages::DOWNLOAD_FAILED);
                false
            }
        }
    }

    // --- Video platforms ---

    /// Looks up the title of a video link and shows it on the platform's tab.
    pub async fn fetch_title(&self, platform: Platform, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            self.view.alert(messages::EMPTY_URL);
            return false;
        }

        self.view.set_message(messages::FETCHING_INFO);
        match self.client.fetch_title(url).await {
            Ok(res) if res.success => {
                {
                    let mut tabs = self.tabs();
                    let controls = tabs.controls_mut(platform);
                    controls.title = res.title.clone();
                    if res.thumbnail.is_some() {
                        controls.thumbnail = res.thumbnail.clone();
                    }
                }
                self.view.show_title(platform, &res.title, res.thumbnail.as_deref());
                self.view.set_message(messages::VIDEO_FOUND);
                true
            }
            Ok(res) => {
                self.view.alert(&format!("Error: {}", res.title));
                self.view.set_message(messages::FETCH_ERROR);
                false
            }
            Err(e) => {
                error!("title fetch for {} failed: {}", url, e);
                self.view.alert("Failed to fetch title");
                false
            }
        }
    }

    /// Starts the download configured on `platform`'s tab.
    pub async fn start_download(&self, platform: Platform) -> bool {
        let controls = self.tabs().controls(platform).clone();
        if platform == Platform::Instagram {
            return self.download_instagram_direct(&controls).await;
        }

        if self.is_downloading() {
            self.view.alert(messages::ALREADY_DOWNLOADING);
            return false;
        }
        if controls.url.trim().is_empty() {
            self.view.alert(messages::EMPTY_URL);
            return false;
        }
        if !self.enter_request() {
            return false;
        }

        let request = StartDownloadRequest {
            url: controls.url.trim().to_string(),
            quality: controls.quality,
            mode: controls.mode,
            download_folder: controls.folder,
            platform: platform.id().to_string(),
        };
        info!("starting {} download of {} ({}, {})", platform, request.url, request.quality, request.mode);
        match self.client.start_download(&request).await {
            Ok(res) if res.success => {
                self.poller.start();
                true
            }
            Ok(res) => {
                self.poller.request_failed();
                self.view.alert(&format!("Error: {}", res.message_or("unknown error")));
                false
            }
            Err(e) => {
                self.poller.request_failed();
                error!("start request failed: {}", e);
                self.view.alert("Failed to start download");
                false
            }
        }
    }

    /// One-shot Instagram download: the backend answers when it is done, with the file list.
    async fn download_instagram_direct(&self, controls: &TabControls) -> bool {
        if self.is_downloading() {
            self.view.alert(messages::ALREADY_DOWNLOADING);
            return false;
        }
        let url = controls.url.trim();
        if url.is_empty() {
            self.view.alert(messages::EMPTY_INSTAGRAM_URL);
            return false;
        }
        if !self.enter_request() {
            return false;
        }

        self.view.set_message(messages::DOWNLOADING_INSTAGRAM);
        let res = match self.client.download_instagram(url, &controls.folder).await {
            Ok(res) => res,
            Err(e) => {
                self.poller.request_failed();
                error!("instagram download of {} failed: {}", url, e);
                self.view.alert("Failed to download from Instagram");
                return false;
            }
        };

        let message = res.message.clone().unwrap_or_default();
        if !res.success {
            self.poller.request_failed();
            self.view.alert(&format!("Error: {}", message));
            self.view.set_message(&format!("Error: {}", message));
            return false;
        }

        self.view.set_message(&message);
        self.view.alert(&message);
        let files = res.files.unwrap_or_default();
        self.trigger_all(&files).await;
        self.poller.end_request(Outcome::Finished);
        true
    }

    async fn trigger_all(&self, files: &[String]) {
        stream::iter(files)
            .for_each_concurrent(TRIGGER_CONCURRENCY, |file| async move {
                if let Err(e) = self.trigger.trigger(file).await {
                    error!("saving '{}' failed: {}", file, e);
                    self.view.alert(&format!("Could not save '{}': {}", file, e));
                }
            })
            .await;
    }

    // --- Misc actions ---

    pub async fn toggle_pause(&self) -> bool {
        match self.client.toggle_pause().await {
            Ok(res) => {
                self.view.set_message(&res.message);
                true
            }
            Err(e) => {
                error!("toggle pause failed: {}", e);
                false
            }
        }
    }

    /// Opens `folder` (or the active tab's folder when empty) on the backend machine.
    pub async fn open_folder(&self, folder: &str) -> bool {
        let folder = if folder.is_empty() {
            self.tabs().active_controls_mut().folder.clone()
        } else {
            folder.to_string()
        };
        match self.client.open_folder(&folder).await {
            Ok(res) if res.success => true,
            Ok(res) => {
                self.view.alert(&res.message_or("Could not open folder"));
                false
            }
            Err(e) => {
                error!("open folder failed: {}", e);
                false
            }
        }
    }

    /// Shows the backend's folder picker; the choice becomes the active tab's folder.
    pub async fn browse_folder(&self) -> Option<String> {
        match self.client.browse_folder().await {
            Ok(res) if res.success => {
                let path = res.path.unwrap_or_default();
                self.tabs().active_controls_mut().folder = path.clone();
                if let Err(e) = save_download_folder(&path) {
                    warn!("could not remember folder '{}': {}", path, e);
                }
                Some(path)
            }
            Ok(res) => {
                match res.message.as_deref() {
                    Some(msg) if msg != messages::NO_FOLDER_SELECTED => self.view.alert(msg),
                    _ => debug!("folder picker closed without a choice"),
                }
                None
            }
            Err(e) => {
                error!("browse folder failed: {}", e);
                None
            }
        }
    }

    pub async fn status(&self) -> AppResult<DownloadStatus> {
        self.client.get_status().await
    }

    fn enter_request(&self) -> bool {
        match self.poller.begin_request() {
            Ok(()) => true,
            Err(AppError::Busy) => {
                self.view.alert(messages::ALREADY_DOWNLOADING);
                false
            }
            Err(e) => {
                self.view.alert(&e.to_string());
                false
            }
        }
    }
}
