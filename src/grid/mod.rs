/// Tile grid module
///
/// - `tile.rs` - tiles, axis descriptors and the field-coordinate index
/// - `overlap.rs` - overlap between field-adjacent tiles, used to trim vignetted edges

pub mod overlap;
pub mod tile;

pub use overlap::EdgeOverlap;
pub use tile::{Axis, AxisDescriptor, DisplayRect, FieldKey, ThumbnailSlot, Tile, TileGrid};
