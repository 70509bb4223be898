// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const MAX_FILENAME_BYTES: usize = 200;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "app.log";
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const SERVER_ENV_VAR: &str = "UVD_SERVER";
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SAVE_DIR: &str = "downloads";
pub const DEFAULT_VIDEO_QUALITY: &str = "best";
pub const DEFAULT_MODE: &str = "Video";
pub const DEFAULT_SELECTION: &str = "all";
pub const POLL_INTERVAL_MS: u64 = 1000;
pub const FINISH_DELAY_MS: u64 = 1000;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Texts shown on the status line and in alerts.
pub mod messages {
    pub const FETCHING_INFO: &str = "Fetching video info...";
    pub const FETCHING_MEDIA: &str = "Fetching Instagram media...";
    pub const FETCH_ERROR: &str = "Error fetching info";
    pub const VIDEO_FOUND: &str = "Video found!";
    pub const STARTING: &str = "Starting download...";
    pub const DOWNLOADING_INSTAGRAM: &str = "Downloading from Instagram...";
    pub const FINISHED: &str = "Download Finished!";
    pub const DOWNLOAD_FAILED: &str = "Download failed";
    pub const ALREADY_DOWNLOADING: &str = "A download is already in progress";
    pub const EMPTY_URL: &str = "Please enter a URL";
    pub const EMPTY_INSTAGRAM_URL: &str = "Please enter an Instagram URL";
    pub const EMPTY_SELECTION: &str = "Please select at least one item.";
    pub const NO_MEDIA: &str = "No media to download.";
    pub const NO_FOLDER_SELECTED: &str = "No folder selected";
}

/// Backend routes.
pub mod api {
    pub const FETCH_INSTAGRAM_INFO: &str = "/fetch_instagram_info";
    pub const PROXY_IMAGE: &str = "/proxy_image";
    pub const DOWNLOAD_INSTAGRAM_FILES: &str = "/download_instagram_files";
    pub const FETCH_TITLE: &str = "/fetch_title";
    pub const START_DOWNLOAD: &str = "/start_download";
    pub const DOWNLOAD_INSTAGRAM: &str = "/download_instagram";
    pub const GET_STATUS: &str = "/get_status";
    pub const TOGGLE_PAUSE: &str = "/toggle_pause";
    pub const OPEN_FOLDER: &str = "/open_folder";
    pub const BROWSE_FOLDER: &str = "/browse_folder";
    pub const DOWNLOADS: &str = "/downloads/";
}
