//! Tap hit-testing: which [`Intent`] a terminal row dispatches.
//!
//! The renderer fills a [`ClickMap`] while it draws, so the rows a player can
//! tap are exactly the rows that were laid out this frame. Pixel coordinates
//! only come in at the edge (`intent_at_pixel`); DOM access stays in `main`.

use ratzilla::ratatui::layout::Rect;

use crate::actions::Intent;

/// One tappable terminal row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hotspot {
    pub row: u16,
    pub intent: Intent,
}

/// Rows registered during the last frame. Earlier registrations win, so
/// overlays register before the rows they cover.
#[derive(Debug, Default)]
pub struct ClickMap {
    hotspots: Vec<Hotspot>,
    grid: Rect,
}

impl ClickMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget last frame's rows and remember the size of the new one.
    pub fn reset(&mut self, grid: Rect) {
        self.hotspots.clear();
        self.grid = grid;
    }

    /// False until a frame with a non-empty grid has been drawn.
    pub fn is_ready(&self) -> bool {
        self.grid.width > 0 && self.grid.height > 0
    }

    /// Every row of `area` dispatches `intent`.
    pub fn cover(&mut self, area: Rect, intent: Intent) {
        for row in area.top()..area.bottom() {
            self.hotspots.push(Hotspot { row, intent });
        }
    }

    /// One row per intent inside a bordered block, top to bottom. Rows that
    /// the layout squeezed out (or that land on the bottom border) are
    /// skipped. Returns how many rows were registered.
    pub fn list_rows<I>(&mut self, block: Rect, intents: I) -> usize
    where
        I: IntoIterator<Item = Intent>,
    {
        let first = block.top().saturating_add(1);
        let end = block.bottom().saturating_sub(1);
        let before = self.hotspots.len();
        for (row, intent) in (first..end).zip(intents) {
            self.hotspots.push(Hotspot { row, intent });
        }
        self.hotspots.len() - before
    }

    pub fn intent_at(&self, row: u16) -> Option<Intent> {
        self.hotspots
            .iter()
            .find(|h| h.row == row)
            .map(|h| h.intent)
    }

    /// `click_y` is relative to the top edge of the grid element, whose
    /// rendered height is `grid_height` pixels.
    pub fn intent_at_pixel(&self, click_y: f64, grid_height: f64) -> Option<Intent> {
        let row = pixel_row(click_y, grid_height, self.grid.height)?;
        self.intent_at(row)
    }

    #[cfg(test)]
    pub fn rows_for(&self, intent: Intent) -> Vec<u16> {
        self.hotspots
            .iter()
            .filter(|h| h.intent == intent)
            .map(|h| h.row)
            .collect()
    }

    #[cfg(test)]
    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }
}

/// Terminal row under a pixel offset, or `None` outside the grid.
fn pixel_row(click_y: f64, grid_height: f64, rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || rows == 0 || click_y < 0.0 {
        return None;
    }
    let row = (click_y * rows as f64 / grid_height) as u16;
    (row < rows).then_some(row)
}
