// src/config.rs

pub mod file;

use self::file::{load_or_create_external_config, resolve_server};
use crate::{cli::Cli, constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub server: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PollingConfig {
    pub interval_ms: Option<u64>,
    pub finish_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Folder the backend is told to save into.
    pub download_folder: Option<String>,
    /// Local directory completed files are fetched into.
    pub output_dir: Option<PathBuf>,
    pub quality: Option<String>,
    pub mode: Option<String>,
}

/// Shape of `~/.uvd/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExternalConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        Self {
            network: NetworkConfig {
                server: Some(constants::DEFAULT_SERVER.into()),
                connect_timeout_secs: Some(10),
                timeout_secs: Some(60),
                max_retries: Some(2),
            },
            polling: PollingConfig {
                interval_ms: Some(constants::POLL_INTERVAL_MS),
                finish_delay_ms: Some(constants::FINISH_DELAY_MS),
            },
            defaults: DefaultsConfig {
                download_folder: None,
                output_dir: Some(PathBuf::from(constants::DEFAULT_SAVE_DIR)),
                quality: Some(constants::DEFAULT_VIDEO_QUALITY.into()),
                mode: Some(constants::DEFAULT_MODE.into()),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub poll_interval: Duration,
    pub finish_delay: Duration,
    /// Empty means "let the backend use its own default folder".
    pub download_folder: String,
    pub output_dir: PathBuf,
    pub default_quality: String,
    pub default_mode: String,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;
        let (server, source) = resolve_server(
            args.server.as_deref(),
            external_config.network.server.as_deref(),
        );
        log::info!("using backend {} (from {})", server, source);

        Ok(Self {
            server,
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(
                external_config.network.connect_timeout_secs.unwrap_or(10),
            ),
            timeout: Duration::from_secs(external_config.network.timeout_secs.unwrap_or(60)),
            max_retries: external_config.network.max_retries.unwrap_or(2),
            poll_interval: Duration::from_millis(
                external_config
                    .polling
                    .interval_ms
                    .unwrap_or(constants::POLL_INTERVAL_MS)
                    .max(1),
            ),
            finish_delay: Duration::from_millis(
                external_config
                    .polling
                    .finish_delay_ms
                    .unwrap_or(constants::FINISH_DELAY_MS),
            ),
            download_folder: args
                .folder
                .clone()
                .or(external_config.defaults.download_folder)
                .unwrap_or_default(),
            output_dir: args
                .output
                .clone()
                .or(external_config.defaults.output_dir)
                .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_SAVE_DIR)),
            default_quality: args
                .quality
                .clone()
                .or(external_config.defaults.quality)
                .unwrap_or_else(|| constants::DEFAULT_VIDEO_QUALITY.into()),
            default_mode: args
                .mode
                .clone()
                .or(external_config.defaults.mode)
                .unwrap_or_else(|| constants::DEFAULT_MODE.into()),
        })
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: constants::DEFAULT_SERVER.to_string(),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 0,
            poll_interval: Duration::from_millis(20),
            finish_delay: Duration::from_millis(20),
            download_folder: String::new(),
            output_dir: PathBuf::from(constants::DEFAULT_SAVE_DIR),
            default_quality: constants::DEFAULT_VIDEO_QUALITY.to_string(),
            default_mode: constants::DEFAULT_MODE.to_string(),
        }
    }
}
