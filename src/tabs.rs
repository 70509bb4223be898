// src/tabs.rs

use crate::{cli::Platform, config::AppConfig};
use std::collections::BTreeMap;

/// Form state of one platform tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabControls {
    pub url: String,
    pub quality: String,
    pub mode: String,
    pub folder: String,
    pub title: String,
    pub thumbnail: Option<String>,
}

/// Every tab and its controls, built once at setup.
#[derive(Debug, Clone)]
pub struct TabRegistry {
    tabs: BTreeMap<Platform, TabControls>,
    active: Platform,
}

impl TabRegistry {
    pub fn new(config: &AppConfig) -> Self {
        let tabs = Platform::ALL
            .iter()
            .map(|&platform| {
                (
                    platform,
                    TabControls {
                        quality: config.default_quality.clone(),
                        mode: config.default_mode.clone(),
                        folder: config.download_folder.clone(),
                        ..Default::default()
                    },
                )
            })
            .collect();
        Self {
            tabs,
            active: Platform::YouTube,
        }
    }

    /// Makes `platform` the only active tab and hands back its controls.
    pub fn open_tab(&mut self, platform: Platform) -> &mut TabControls {
        self.active = platform;
        self.controls_mut(platform)
    }

    pub fn active(&self) -> Platform {
        self.active
    }

    pub fn is_active(&self, platform: Platform) -> bool {
        self.active == platform
    }

    pub fn controls(&self, platform: Platform) -> &TabControls {
        // every platform is inserted in `new`
        &self.tabs[&platform]
    }

    pub fn controls_mut(&mut self, platform: Platform) -> &mut TabControls {
        self.tabs.entry(platform).or_default()
    }

    pub fn active_controls_mut(&mut self) -> &mut TabControls {
        let active = self.active;
        self.controls_mut(active)
    }

    /// Copies a polled title into each video tab whose title slot is still empty.
    pub fn fill_missing_titles(&mut self, title: &str) -> Vec<Platform> {
        if title.is_empty() {
            return Vec::new();
        }
        let mut filled = Vec::new();
        for (platform, controls) in self.tabs.iter_mut() {
            if platform.is_video_platform() && controls.title.is_empty() {
                controls.title = title.to_string();
                filled.push(*platform);
            }
        }
        filled
    }
}
