// src/config/file.rs

use crate::{
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use std::{fs, path::PathBuf};

pub(super) fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("could not determine the home directory")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

pub(crate) fn load_or_create_external_config() -> AppResult<ExternalConfig> {
    let config_path = get_config_path()?;
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file '{}'", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file '{}'", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("config file {:?} does not exist, writing defaults", config_path);
        let config = ExternalConfig::default_app_config();

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_content = serde_json::to_string_pretty(&config)?;
        fs::write(&config_path, json_content)?;

        Ok(config)
    }
}

/// Remembers a folder chosen through the backend's folder picker.
pub fn save_download_folder(folder: &str) -> AppResult<()> {
    if folder.is_empty() {
        return Ok(());
    }

    let config_path = get_config_path()?;
    let mut config = load_or_create_external_config()?;

    config.defaults.download_folder = Some(folder.to_string());

    let json_content = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, json_content)
        .with_context(|| format!("failed to save download folder to '{}'", config_path.display()))?;

    info!("saved download folder '{}' to {}", folder, config_path.display());
    Ok(())
}

/// CLI flag, then `UVD_SERVER`, then the config file, then the built-in default.
pub fn resolve_server(cli_server: Option<&str>, file_server: Option<&str>) -> (String, String) {
    let env_server = std::env::var(constants::SERVER_ENV_VAR).ok();
    pick_server(cli_server, env_server.as_deref(), file_server)
}

fn pick_server(
    cli_server: Option<&str>,
    env_server: Option<&str>,
    file_server: Option<&str>,
) -> (String, String) {
    if let Some(server) = cli_server && !server.trim().is_empty() {
        debug!("backend from command line");
        return (normalize(server), "command line".to_string());
    }
    if let Some(server) = env_server && !server.trim().is_empty() {
        debug!("backend from {}", constants::SERVER_ENV_VAR);
        return (normalize(server), format!("environment ({})", constants::SERVER_ENV_VAR));
    }
    if let Some(server) = file_server && !server.trim().is_empty() {
        debug!("backend from config file");
        return (normalize(server), "config file".to_string());
    }
    debug!("no backend configured, using default");
    (constants::DEFAULT_SERVER.to_string(), "default".to_string())
}

fn normalize(server: &str) -> String {
    server.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_precedence() {
        let (s, src) = pick_server(Some("http://a:1/"), Some("http://b:2"), Some("http://c:3"));
        assert_eq!(s, "http://a:1");
        assert_eq!(src, "command line");

        let (s, _) = pick_server(None, Some("http://b:2"), Some("http://c:3"));
        assert_eq!(s, "http://b:2");

        let (s, src) = pick_server(Some("  "), None, Some("http://c:3//"));
        assert_eq!(s, "http://c:3");
        assert_eq!(src, "config file");

        let (s, src) = pick_server(None, Some(""), None);
        assert_eq!(s, constants::DEFAULT_SERVER);
        assert_eq!(src, "default");
    }
}
