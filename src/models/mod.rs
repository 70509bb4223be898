// src/models/mod.rs

pub mod api;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    #[serde(other)]
    Unknown,
}

/// One downloadable unit surfaced by a metadata fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(rename = "type", default)]
    pub media_type: MediaType,
}

impl MediaItem {
    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }
}

/// Snapshot returned by `/get_status`.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DownloadStatus {
    #[serde(default)]
    pub is_downloading: bool,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default, deserialize_with = "clamped_progress")]
    pub progress: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub current_file: Option<String>,
}

impl DownloadStatus {
    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }

    /// The backend sends `""` as often as `null` for "no title yet".
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn completed_file(&self) -> Option<&str> {
        self.current_file.as_deref().filter(|f| !f.is_empty())
    }
}

fn clamped_progress<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if raw.is_nan() {
        return Ok(0.0);
    }
    Ok(raw.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_item_type_field() {
        let item: MediaItem = serde_json::from_str(
            r#"{"url": "https://cdn/v.mp4", "thumbnail": "https://cdn/t.jpg", "type": "video"}"#,
        )
        .unwrap();
        assert!(item.is_video());

        let item: MediaItem =
            serde_json::from_str(r#"{"url": "https://cdn/a.jpg", "type": "carousel"}"#).unwrap();
        assert_eq!(item.media_type, MediaType::Unknown);
        assert_eq!(item.thumbnail, "");
    }

    #[test]
    fn test_status_progress_is_clamped() {
        let s: DownloadStatus =
            serde_json::from_str(r#"{"is_downloading": true, "progress": 42.5, "message": "x"}"#).unwrap();
        assert_eq!(s.progress, 42.5);
        assert!(!s.is_complete());

        let s: DownloadStatus = serde_json::from_str(r#"{"progress": 130}"#).unwrap();
        assert_eq!(s.progress, 100.0);
        assert!(s.is_complete());

        let s: DownloadStatus = serde_json::from_str(r#"{"progress": null}"#).unwrap();
        assert_eq!(s.progress, 0.0);
    }

    #[test]
    fn test_status_empty_strings_are_absent() {
        let s: DownloadStatus = serde_json::from_str(
            r#"{"is_downloading": false, "progress": 100, "message": "done", "title": "", "current_file": null}"#,
        )
        .unwrap();
        assert_eq!(s.title(), None);
        assert_eq!(s.completed_file(), None);
    }
}
