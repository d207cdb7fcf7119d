/// Thumbnail module
///
/// This module handles:
/// - Decoding tile images into small previews (decode.rs)
/// - The tick-driven sweep that fills the cache one tile at a time (loader.rs)

pub mod decode;
pub mod loader;

pub use decode::DEFAULT_THUMBNAIL_WIDTH;
pub use loader::{Sweep, ThumbnailLoader};
