/// Incremental thumbnail sweep
///
/// The loader never runs on its own. The host calls `tick()` periodically
/// and each call decodes at most one tile, so decoding never blocks
/// interaction for longer than a single image.

use crate::error::ThumbnailError;
use crate::grid::{ThumbnailSlot, TileGrid};

use super::decode::decode_thumbnail;

/// Result of one unit of thumbnail work
#[derive(Debug)]
pub enum Sweep {
    /// The tile at this index now has a thumbnail
    Decoded(usize),
    /// The tile's image could not be decoded; it stays an outline
    Failed { index: usize, error: ThumbnailError },
    /// The sweep just ran past the last tile and went idle
    Finished,
    /// Nothing to do until the next grid load
    Idle,
}

impl Sweep {
    /// Whether the tile cache changed and the minimap needs repainting
    pub fn changed(&self) -> bool {
        matches!(self, Sweep::Decoded(_))
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailLoader {
    /// Next tile index that may still be pending
    cursor: usize,
    active: bool,
    target_width: u32,
}

impl ThumbnailLoader {
    pub fn new(target_width: u32) -> Self {
        Self {
            cursor: 0,
            active: false,
            target_width,
        }
    }

    /// Start a fresh sweep from the first tile
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.active = true;
    }

    /// Whether the host should keep ticking
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Tiles the sweep has moved past
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advance the sweep by one tile
    pub fn tick(&mut self, grid: &mut TileGrid) -> Sweep {
        if !self.active {
            return Sweep::Idle;
        }

        while grid
            .tile(self.cursor)
            .is_some_and(|tile| !tile.thumbnail.is_pending())
        {
            self.cursor += 1;
        }

        if self.cursor >= grid.len() {
            self.active = false;
            tracing::debug!(tiles = grid.len(), "thumbnail sweep finished");
            return Sweep::Finished;
        }

        let sweep = self.decode_into(grid, self.cursor);
        self.cursor += 1;
        sweep
    }

    /// Decode one tile right away, independent of the sweep.
    ///
    /// Returns `None` when the tile is unknown or already settled.
    pub fn request(&self, grid: &mut TileGrid, index: usize) -> Option<Sweep> {
        let tile = grid.tile(index)?;
        if !tile.thumbnail.is_pending() {
            return None;
        }
        Some(self.decode_into(grid, index))
    }

    fn decode_into(&self, grid: &mut TileGrid, index: usize) -> Sweep {
        let Some(path) = grid.image_path(index).map(|p| p.to_path_buf()) else {
            return Sweep::Idle;
        };

        match decode_thumbnail(&path, self.target_width) {
            Ok(image) => {
                grid.settle_thumbnail(index, ThumbnailSlot::Ready(image));
                tracing::debug!(index, path = %path.display(), "thumbnail decoded");
                Sweep::Decoded(index)
            }
            Err(error) => {
                grid.settle_thumbnail(index, ThumbnailSlot::Failed);
                tracing::warn!(index, "{error}");
                Sweep::Failed { index, error }
            }
        }
    }
}
