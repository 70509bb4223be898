// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, command, crate_version};
use std::fmt;

/// Log file verbosity
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Platforms the backend knows how to download from
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    #[value(name = "youtube")]
    YouTube,
    #[value(name = "facebook")]
    Facebook,
    #[value(name = "tiktok")]
    TikTok,
    #[value(name = "instagram")]
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::YouTube,
        Platform::Facebook,
        Platform::TikTok,
        Platform::Instagram,
    ];

    /// The identifier sent to the backend as the `platform` form field.
    pub fn id(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Facebook => "facebook",
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }

    /// Instagram goes through the media picker instead of the quality/mode form.
    pub fn is_video_platform(&self) -> bool {
        !matches!(self, Platform::Instagram)
    }

    /// Best-effort guess from a pasted link.
    pub fn detect(url: &str) -> Option<Self> {
        let host = url::Url::parse(url).ok()?.host_str()?.to_lowercase();
        if host.ends_with("youtube.com") || host == "youtu.be" {
            Some(Platform::YouTube)
        } else if host.ends_with("facebook.com") || host == "fb.watch" {
            Some(Platform::Facebook)
        } else if host.ends_with("tiktok.com") {
            Some(Platform::TikTok)
        } else if host.ends_with("instagram.com") {
            Some(Platform::Instagram)
        } else {
            None
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::YouTube => "YouTube",
            Platform::Facebook => "Facebook",
            Platform::TikTok => "TikTok",
            Platform::Instagram => "Instagram",
        };
        f.write_str(name)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("action")
        .required(true)
        .args(&["interactive", "url", "status", "pause", "open_folder", "browse_folder"]),
))]
pub struct Cli {
    // --- Mode ---
    /// Start an interactive session (pick a platform tab, paste links, select media)
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub interactive: bool,
    /// Download from a single link
    #[arg(long, help_heading = "Mode")]
    pub url: Option<String>,
    /// Print the backend's current download status and exit
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub status: bool,
    /// Pause or resume the running download
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub pause: bool,
    /// Ask the backend to open a folder in the file manager (defaults to the download folder)
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = "", help_heading = "Mode")]
    pub open_folder: Option<String>,
    /// Ask the backend to show a folder picker and print the chosen path
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub browse_folder: bool,

    // --- Options ---
    /// Platform of the link (detected from the link when omitted)
    #[arg(short, long, value_enum, help_heading = "Options")]
    pub platform: Option<Platform>,
    /// Video quality: 'best' or a height such as '1080p', '720p' [default: best]
    #[arg(short = 'q', long, help_heading = "Options")]
    pub quality: Option<String>,
    /// Download mode: 'Video' or 'Audio' [default: Video]
    #[arg(short, long, help_heading = "Options")]
    pub mode: Option<String>,
    /// Folder the backend saves into (defaults to the configured download folder)
    #[arg(long, value_name = "DIR", help_heading = "Options")]
    pub folder: Option<String>,
    /// Local directory completed files are saved to
    #[arg(short, long, value_name = "DIR", help_heading = "Options")]
    pub output: Option<std::path::PathBuf>,
    /// Only fetch and print the title / media list, do not download
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub info_only: bool,
    /// [Instagram] Items to download, e.g. '1-3,5' or 'all'
    #[arg(long, default_value_t = constants::DEFAULT_SELECTION.to_string(), value_name = "SELECTION", help_heading = "Options")]
    pub select: String,
    /// [Instagram] Let the backend download the whole post in one request
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub direct: bool,
    /// Backend base URL (overrides UVD_SERVER and the config file)
    #[arg(long, value_name = "URL", help_heading = "Options")]
    pub server: Option<String>,

    // --- General ---
    /// Print this help and exit
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// Print the version and exit
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (hidden) Log file verbosity, for debugging
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

impl Cli {
    /// The platform to use for `--url`: explicit flag first, then detection.
    pub fn resolve_platform(&self) -> Option<Platform> {
        self.platform
            .or_else(|| self.url.as_deref().and_then(Platform::detect))
    }
}
