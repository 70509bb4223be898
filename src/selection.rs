// src/selection.rs

use crate::{
    client::proxy_image_url,
    models::MediaItem,
    render::{RenderTarget, Tile},
    utils,
};
use log::debug;

/// The fetched media list plus one independent checkbox per tile.
///
/// Checkbox state lives next to the list, indexed by position; `MediaItem`
/// itself is never mutated.
pub struct SelectionManager<R: RenderTarget> {
    items: Vec<MediaItem>,
    checked: Vec<bool>,
    server: String,
    target: R,
}

impl<R: RenderTarget> SelectionManager<R> {
    /// `server` is the backend base URL thumbnails are proxied through.
    pub fn new(target: R, server: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            checked: Vec::new(),
            server: server.into(),
            target,
        }
    }

    /// Replaces the displayed items, one unchecked tile per entry.
    pub fn render(&mut self, media: Vec<MediaItem>) {
        debug!("rendering {} media tiles", media.len());
        self.checked = vec![false; media.len()];
        self.items = media;
        let tiles = self.tiles();
        self.target.render(&tiles);
    }

    pub fn tiles(&self) -> Vec<Tile> {
        self.items
            .iter()
            .zip(&self.checked)
            .enumerate()
            .map(|(index, (item, &checked))| Tile {
                index,
                thumbnail: proxy_image_url(&self.server, &item.thumbnail),
                is_video: item.is_video(),
                checked,
            })
            .collect()
    }

    /// A click on the tile body (anywhere but the checkbox) flips its checkbox.
    /// Returns the new state, or `None` for an index with no tile.
    pub fn click_tile(&mut self, index: usize) -> Option<bool> {
        let current = *self.checked.get(index)?;
        self.set_checked(index, !current)
    }

    /// The checkbox itself changed. Only an actual change reaches the render target.
    pub fn set_checked(&mut self, index: usize, checked: bool) -> Option<bool> {
        let slot = self.checked.get_mut(index)?;
        if *slot != checked {
            *slot = checked;
            self.target.selection_changed(index, checked);
        }
        Some(checked)
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(index).copied().unwrap_or(false)
    }

    /// Checks exactly the tiles named by a "1,3-5" / "all" expression.
    /// Returns how many tiles end up checked.
    pub fn select_from_expression(&mut self, expression: &str) -> usize {
        let wanted = utils::parse_selection_indices(expression, self.items.len());
        for index in 0..self.items.len() {
            self.set_checked(index, wanted.binary_search(&index).is_ok());
        }
        wanted.len()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.checked
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| c.then_some(i))
            .collect()
    }

    /// URLs of the checked items, in list order.
    pub fn get_selected(&self) -> Vec<String> {
        self.selected_indices()
            .into_iter()
            .map(|i| self.items[i].url.clone())
            .collect()
    }

    pub fn get_all(&self) -> Vec<String> {
        self.items.iter().map(|m| m.url.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }
}
