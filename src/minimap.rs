/// Minimap state and the operations the UI drives
///
/// Owns the tile grid, the current selection and the thumbnail sweep.
/// Every mutation happens inside one of the operations below, on the
/// caller's thread, and is announced through `Observers`.

use std::path::Path;

use crate::error::{MetadataError, UnitMismatch};
use crate::grid::TileGrid;
use crate::navigator;
use crate::observe::{Change, Observers, SubscriptionId};
use crate::scan::{self, ParsedScan};
use crate::thumbnail::{Sweep, ThumbnailLoader};

#[derive(Debug)]
pub struct Minimap {
    grid: TileGrid,
    loaded: bool,
    /// Base name of the loaded scan directory
    scan_name: Option<String>,
    /// Index into the grid's tiles; meaningful only for a non-empty grid
    selected: usize,
    loader: ThumbnailLoader,
    viewport_width: f64,
    viewport_height: f64,
    /// Display width after fitting the grid into the viewport
    display_width: f64,
    observers: Observers,
}

impl Minimap {
    pub fn new(thumbnail_width: u32, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            grid: TileGrid::default(),
            loaded: false,
            scan_name: None,
            selected: 0,
            loader: ThumbnailLoader::new(thumbnail_width),
            viewport_width,
            viewport_height,
            display_width: 0.0,
            observers: Observers::default(),
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(Change) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    /// Replace the grid with the scan in `dir`.
    ///
    /// The new grid is built completely before it is swapped in; on error
    /// the previous grid, selection and sweep are left as they were.
    /// Unit mismatches are returned (and logged) but do not fail the load.
    pub fn load(&mut self, dir: &Path) -> Result<Vec<UnitMismatch>, MetadataError> {
        let ParsedScan { mut grid, warnings } = scan::load_scan(dir)?;
        let name = scan::scan_name(dir)?;

        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        self.display_width = grid.fit_to_viewport(self.viewport_width, self.viewport_height);
        self.grid = grid;
        self.scan_name = Some(name);
        self.selected = 0;
        self.loaded = true;
        self.loader.restart();

        tracing::info!(
            scan = %dir.display(),
            tiles = self.grid.len(),
            scale = self.grid.scale(),
            "minimap loaded"
        );

        self.observers.notify_all(&Change::ALL);
        Ok(warnings)
    }

    /// Select the tile nearest to a display-space point
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        match navigator::nearest_tile(&self.grid, x, y) {
            Some(index) => {
                self.select(index);
                true
            }
            None => false,
        }
    }

    /// Select the field-adjacent neighbor, if there is one
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        if self.grid.is_empty() {
            return false;
        }
        match navigator::neighbor(&self.grid, self.selected, dx, dy) {
            Some(index) => {
                self.select(index);
                true
            }
            None => false,
        }
    }

    /// Select the next tile in parse order, stopping at the last
    pub fn advance(&mut self) -> bool {
        match navigator::advance(&self.grid, self.selected) {
            Some(index) => {
                self.select(index);
                true
            }
            None => false,
        }
    }

    /// One unit of background thumbnail work, called by the host's timer
    pub fn tick(&mut self) -> Sweep {
        let sweep = self.loader.tick(&mut self.grid);
        if sweep.changed() {
            self.observers.notify(Change::Redraw);
        }
        sweep
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        // Failures are logged by the loader; the tile just stays an outline
        let _ = self.loader.request(&mut self.grid, index);
        self.observers.notify_all(&Change::SELECTION);
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the host should keep calling `tick`
    /// Tiles the sweep has passed, out of all tiles
    pub fn sweep_progress(&self) -> (usize, usize) {
        let total = self.grid.len();
        if self.loader.is_active() {
            (self.loader.cursor().min(total), total)
        } else {
            (total, total)
        }
    }

    pub fn scan_name(&self) -> Option<&str> {
        self.scan_name.as_deref()
    }

    pub fn sweep_active(&self) -> bool {
        self.loader.is_active()
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.grid.is_empty()).then_some(self.selected)
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.selected_index().and_then(|i| self.grid.image_path(i))
    }

    pub fn position_x(&self) -> f64 {
        self.selected_index()
            .and_then(|i| self.grid.tile(i))
            .map_or(0.0, |t| t.pos_x)
    }

    pub fn position_y(&self) -> f64 {
        self.selected_index()
            .and_then(|i| self.grid.tile(i))
            .map_or(0.0, |t| t.pos_y)
    }

    pub fn total_width(&self) -> f64 {
        self.grid.total_width()
    }

    pub fn total_height(&self) -> f64 {
        self.grid.total_height()
    }

    /// Physical width of one tile
    pub fn image_width(&self) -> f64 {
        self.grid.axis_x().length
    }

    pub fn image_height(&self) -> f64 {
        self.grid.axis_y().length
    }

    pub fn display_width(&self) -> f64 {
        self.display_width
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}
