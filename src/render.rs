// src/render.rs

//! Output surfaces. The selection and polling logic only talk to these traits;
//! the console implementations below are what the binary plugs in.

use crate::{cli::Platform, symbols, ui, utils};
use colored::*;
use indicatif::ProgressBar;
use std::sync::Mutex;

/// What one media tile shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    /// Proxied thumbnail address (`/proxy_image?url=...`).
    pub thumbnail: String,
    pub is_video: bool,
    pub checked: bool,
}

/// Accepts a list of tiles and is told whenever one tile's checkbox changes.
pub trait RenderTarget: Send {
    fn render(&mut self, tiles: &[Tile]);
    /// Called once per checkbox change so the tile's "selected" border can follow.
    fn selection_changed(&mut self, index: usize, selected: bool);
}

/// Status line, progress bar, alerts and per-tab title display.
pub trait StatusView: Send + Sync {
    fn set_progress(&self, percent: f64);
    fn set_message(&self, message: &str);
    fn alert(&self, message: &str);
    fn show_title(&self, platform: Platform, title: &str, thumbnail: Option<&str>);
    /// The poll cycle is over; drop any live progress display.
    fn idle(&self) {}
}

#[derive(Default)]
pub struct ConsoleRenderer {
    tiles: Vec<Tile>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_tile(tile: &Tile) {
        let checkbox = if tile.checked { "[x]".green().bold() } else { "[ ]".normal() };
        let kind = if tile.is_video { (*symbols::VIDEO).clone() } else { "   ".normal() };
        println!(
            "  {} {:>3}. {} {}",
            checkbox,
            tile.index + 1,
            kind,
            utils::truncate_text(&tile.thumbnail, 70).dimmed()
        );
    }
}

impl RenderTarget for ConsoleRenderer {
    fn render(&mut self, tiles: &[Tile]) {
        self.tiles = tiles.to_vec();
        if tiles.is_empty() {
            ui::info("No media items.");
            return;
        }
        ui::print_sub_header(&format!("{} media items", tiles.len()));
        for tile in &self.tiles {
            Self::print_tile(tile);
        }
    }

    fn selection_changed(&mut self, index: usize, selected: bool) {
        if let Some(tile) = self.tiles.get_mut(index) {
            tile.checked = selected;
            log::trace!("tile {} border -> {}", index, if selected { "selected" } else { "plain" });
        }
    }
}

/// Status line and progress bar on the terminal.
#[derive(Default)]
pub struct ConsoleStatusView {
    pbar: Mutex<Option<ProgressBar>>,
}

impl ConsoleStatusView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusView for ConsoleStatusView {
    fn set_progress(&self, percent: f64) {
        let mut guard = self.pbar.lock().unwrap();
        let pbar = guard.get_or_insert_with(|| ui::new_percent_progress_bar("Download"));
        pbar.set_position(percent.round() as u64);
    }

    fn set_message(&self, message: &str) {
        match self.pbar.lock().unwrap().as_ref() {
            Some(pbar) => pbar.set_message(message.to_string()),
            None => ui::info(message),
        }
    }

    fn alert(&self, message: &str) {
        match self.pbar.lock().unwrap().as_ref() {
            Some(pbar) => pbar.suspend(|| ui::warn(message)),
            None => ui::warn(message),
        }
    }

    fn show_title(&self, platform: Platform, title: &str, thumbnail: Option<&str>) {
        let mut lines = vec![title];
        if let Some(thumb) = thumbnail {
            lines.push(thumb);
        }
        ui::box_message(&format!("{} video", platform), &lines, |s| s.cyan());
    }

    fn idle(&self) {
        if let Some(pbar) = self.pbar.lock().unwrap().take() {
            pbar.finish();
        }
    }
}
