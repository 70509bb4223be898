// src/models/api.rs

use super::MediaItem;
use serde::{Deserialize, Serialize};

// --- Shared response shapes ---

/// `{success, message?}`, returned by most action endpoints.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl AckResponse {
    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

// --- Instagram ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MediaInfoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct InstagramDownloadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// JSON body of `/download_instagram_files`.
#[derive(Serialize, Debug, Clone)]
pub struct DownloadFilesRequest<'a> {
    pub urls: &'a [String],
    pub download_folder: &'a str,
}

// --- Video platforms ---

/// On failure the backend puts the error text into `title`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TitleResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Form fields of `/start_download`.
#[derive(Debug, Clone)]
pub struct StartDownloadRequest {
    pub url: String,
    pub quality: String,
    pub mode: String,
    pub download_folder: String,
    pub platform: String,
}

impl StartDownloadRequest {
    pub fn as_form(&self) -> [(&'static str, &str); 5] {
        [
            ("url", self.url.as_str()),
            ("quality", self.quality.as_str()),
            ("mode", self.mode.as_str()),
            ("download_folder", self.download_folder.as_str()),
            ("platform", self.platform.as_str()),
        ]
    }
}

// --- Misc actions ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PauseResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_paused: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BrowseFolderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
