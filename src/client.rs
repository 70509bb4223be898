// src/client.rs

use crate::{
    config::AppConfig,
    constants::api,
    error::*,
    models::{DownloadStatus, api::*},
};
use async_trait::async_trait;
use log::{debug, trace};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Response;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Anything that can report the backend's download status.
///
/// The poller only needs this one call, which keeps it testable without a server.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn get_status(&self) -> AppResult<DownloadStatus>;
}

/// Same characters a browser's `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `/proxy_image?url=<encoded>`, the address thumbnails are displayed from.
pub fn proxy_image_url(server: &str, image_url: &str) -> String {
    format!(
        "{}{}?url={}",
        server,
        api::PROXY_IMAGE,
        utf8_percent_encode(image_url, URI_COMPONENT)
    )
}

/// HTTP client for every backend route.
///
/// Actions and status polls go out exactly once; only plain downloads
/// (`/proxy_image`, `/downloads/`) are retried on transient failures.
#[derive(Clone)]
pub struct ApiClient {
    pub client: ClientWithMiddleware,
    retrying: ClientWithMiddleware,
    config: Arc<AppConfig>,
}

impl ApiClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let retrying = ClientBuilder::new(http.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let client = ClientBuilder::new(http).build();

        Ok(Self {
            client,
            retrying,
            config,
        })
    }

    pub fn server(&self) -> &str {
        &self.config.server
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.server, path)
    }

    pub fn proxy_image_url(&self, image_url: &str) -> String {
        proxy_image_url(&self.config.server, image_url)
    }

    /// `/downloads/<encoded name>`.
    pub fn download_url(&self, file_name: &str) -> String {
        format!(
            "{}{}",
            self.endpoint(api::DOWNLOADS),
            utf8_percent_encode(file_name, URI_COMPONENT)
        )
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let res = request.send().await?;
        Ok(res.error_for_status()?)
    }

    async fn read_json<T: DeserializeOwned>(&self, url: &str, res: Response) -> AppResult<T> {
        let body = res.text().await?;
        trace!("response from {}: {}", url, body);
        serde_json::from_str(&body).map_err(|source| AppError::ApiParseFailed {
            url: url.to_string(),
            source,
        })
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> AppResult<T> {
        let url = self.endpoint(path);
        debug!("POST {} (form)", url);
        let res = self.send(self.client.post(&url).form(form)).await?;
        self.read_json(&url, res).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = self.endpoint(path);
        debug!("POST {}", url);
        let res = self.send(self.client.post(&url)).await?;
        self.read_json(&url, res).await
    }

    pub async fn fetch_instagram_info(&self, url: &str) -> AppResult<MediaInfoResponse> {
        self.post_form(api::FETCH_INSTAGRAM_INFO, &[("url", url)]).await
    }

    pub async fn proxy_image(&self, image_url: &str) -> AppResult<Vec<u8>> {
        let url = self.proxy_image_url(image_url);
        let res = self.send(self.retrying.get(&url)).await?;
        Ok(res.bytes().await?.to_vec())
    }

    pub async fn download_instagram_files(
        &self,
        urls: &[String],
        download_folder: &str,
    ) -> AppResult<AckResponse> {
        let url = self.endpoint(api::DOWNLOAD_INSTAGRAM_FILES);
        debug!("POST {} (json, {} urls)", url, urls.len());
        let body = DownloadFilesRequest { urls, download_folder };
        let res = self.send(self.client.post(&url).json(&body)).await?;
        self.read_json(&url, res).await
    }

    pub async fn fetch_title(&self, url: &str) -> AppResult<TitleResponse> {
        self.post_form(api::FETCH_TITLE, &[("url", url)]).await
    }

    pub async fn start_download(&self, request: &StartDownloadRequest) -> AppResult<AckResponse> {
        self.post_form(api::START_DOWNLOAD, &request.as_form()).await
    }

    pub async fn download_instagram(
        &self,
        url: &str,
        download_folder: &str,
    ) -> AppResult<InstagramDownloadResponse> {
        self.post_form(
            api::DOWNLOAD_INSTAGRAM,
            &[("url", url), ("download_folder", download_folder)],
        )
        .await
    }

    pub async fn toggle_pause(&self) -> AppResult<PauseResponse> {
        self.post_empty(api::TOGGLE_PAUSE).await
    }

    pub async fn open_folder(&self, folder_path: &str) -> AppResult<AckResponse> {
        self.post_form(api::OPEN_FOLDER, &[("folder_path", folder_path)]).await
    }

    pub async fn browse_folder(&self) -> AppResult<BrowseFolderResponse> {
        self.post_empty(api::BROWSE_FOLDER).await
    }

    pub async fn fetch_file(&self, file_name: &str) -> AppResult<Response> {
        let url = self.download_url(file_name);
        debug!("GET {}", url);
        self.send(self.retrying.get(&url)).await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn get_status(&self) -> AppResult<DownloadStatus> {
        let url = self.endpoint(api::GET_STATUS);
        let res = self.send(self.client.get(&url)).await?;
        self.read_json(&url, res).await
    }
}
