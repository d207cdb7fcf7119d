use image::RgbaImage;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Integer (column, row) address of a tile in the scan
pub type FieldKey = (i32, i32);

/// One of the two spatial axes of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X axis"),
            Axis::Y => write!(f, "Y axis"),
        }
    }
}

/// Per-axis tile geometry from the scan's dimension list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisDescriptor {
    /// Source resolution along the axis
    pub pixel_count: u32,
    /// Physical tile size along the axis (same for every tile)
    pub length: f64,
    /// Declared unit, "m" for a physically meaningful scale
    pub unit: String,
}

impl AxisDescriptor {
    pub fn is_meters(&self) -> bool {
        matches!(self.unit.as_str(), "m" | "meters")
    }
}

/// Decoded preview state of a tile
///
/// Moves out of `Pending` exactly once and is only reset by a grid reload.
#[derive(Debug, Clone, Default)]
pub enum ThumbnailSlot {
    #[default]
    Pending,
    Ready(RgbaImage),
    /// Decode failed; the tile renders as an outline for the life of the grid
    Failed,
}

impl ThumbnailSlot {
    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            ThumbnailSlot::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ThumbnailSlot::Pending)
    }
}

/// One scanned field
#[derive(Debug, Clone)]
pub struct Tile {
    pub field_x: i32,
    pub field_y: i32,
    /// Physical stage position in axis units
    pub pos_x: f64,
    pub pos_y: f64,
    /// Full-resolution source image (not owned)
    pub image_path: PathBuf,
    pub thumbnail: ThumbnailSlot,
}

impl Tile {
    pub fn new(field_x: i32, field_y: i32, pos_x: f64, pos_y: f64, image_path: PathBuf) -> Self {
        Self {
            field_x,
            field_y,
            pos_x,
            pos_y,
            image_path,
            thumbnail: ThumbnailSlot::Pending,
        }
    }

    pub fn field(&self) -> FieldKey {
        (self.field_x, self.field_y)
    }
}

/// Min/max physical tile position over the whole grid
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Zero bounds for an empty tile set
    fn enclosing(tiles: &[Tile]) -> Self {
        let Some(first) = tiles.first() else {
            return Self::default();
        };

        tiles.iter().fold(
            Bounds {
                min_x: first.pos_x,
                min_y: first.pos_y,
                max_x: first.pos_x,
                max_y: first.pos_y,
            },
            |b, t| Bounds {
                min_x: b.min_x.min(t.pos_x),
                min_y: b.min_y.min(t.pos_y),
                max_x: b.max_x.max(t.pos_x),
                max_y: b.max_y.max(t.pos_y),
            },
        )
    }
}

/// Rectangle in display units (physical offset from the grid origin times scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Spatial index over the tiles of one scan
///
/// Tiles keep parse order; their position in `tiles` is their identity.
/// `index` maps field coordinates to that position, last write wins.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    index: HashMap<FieldKey, usize>,
    bounds: Bounds,
    axis_x: AxisDescriptor,
    axis_y: AxisDescriptor,
    scale: f64,
}

impl TileGrid {
    pub fn new(tiles: Vec<Tile>, axis_x: AxisDescriptor, axis_y: AxisDescriptor) -> Self {
        let index = tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| (tile.field(), i))
            .collect();
        let bounds = Bounds::enclosing(&tiles);

        Self {
            tiles,
            index,
            bounds,
            axis_x,
            axis_y,
            scale: 0.0,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn index_of(&self, key: FieldKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    /// Tile stored under the given field coordinates
    pub fn at(&self, key: FieldKey) -> Option<&Tile> {
        self.index_of(key).and_then(|i| self.tiles.get(i))
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn axis_x(&self) -> &AxisDescriptor {
        &self.axis_x
    }

    pub fn axis_y(&self) -> &AxisDescriptor {
        &self.axis_y
    }

    /// Display units per physical unit, 0 until fitted
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Physical width of the whole mosaic, including the far tile's own extent
    pub fn total_width(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.bounds.max_x - self.bounds.min_x + self.axis_x.length
    }

    pub fn total_height(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.bounds.max_y - self.bounds.min_y + self.axis_y.length
    }

    /// Fit the mosaic into a viewport, returning the resulting display width.
    ///
    /// The height is left to the caller so the minimap can keep a fixed
    /// height and a variable width.
    pub fn fit_to_viewport(&mut self, viewport_width: f64, viewport_height: f64) -> f64 {
        let total_width = self.total_width();
        let total_height = self.total_height();

        self.scale = if total_width > 0.0 && total_height > 0.0 {
            (viewport_width / total_width).min(viewport_height / total_height)
        } else {
            0.0
        };

        total_width * self.scale
    }

    /// Untrimmed display rectangle of a tile
    pub fn tile_rect(&self, index: usize) -> Option<DisplayRect> {
        let tile = self.tiles.get(index)?;
        Some(DisplayRect {
            x: (tile.pos_x - self.bounds.min_x) * self.scale,
            y: (tile.pos_y - self.bounds.min_y) * self.scale,
            width: self.axis_x.length * self.scale,
            height: self.axis_y.length * self.scale,
        })
    }

    /// Physical tile center, relative to the grid origin
    pub fn tile_center(&self, index: usize) -> Option<(f64, f64)> {
        let tile = self.tiles.get(index)?;
        Some((
            tile.pos_x - self.bounds.min_x + self.axis_x.length / 2.0,
            tile.pos_y - self.bounds.min_y + self.axis_y.length / 2.0,
        ))
    }

    /// Store a decode result. Only a pending slot accepts one.
    pub(crate) fn settle_thumbnail(&mut self, index: usize, slot: ThumbnailSlot) -> bool {
        match self.tiles.get_mut(index) {
            Some(tile) if tile.thumbnail.is_pending() && !slot.is_pending() => {
                tile.thumbnail = slot;
                true
            }
            _ => false,
        }
    }

    pub fn image_path(&self, index: usize) -> Option<&Path> {
        self.tiles.get(index).map(|t| t.image_path.as_path())
    }
}
