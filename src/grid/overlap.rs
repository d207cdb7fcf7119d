use super::tile::{FieldKey, TileGrid};

/// Overlap fractions of a tile with its four field-adjacent neighbors.
///
/// Values are clamped to [0, 1]; a negative overlap from malformed metadata
/// means no trim.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeOverlap {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl TileGrid {
    /// Fractional (x, y) overlap of two grid-adjacent tiles.
    ///
    /// (0, 0) when either tile is missing or has no thumbnail yet: there is
    /// nothing drawn to trim against.
    pub fn overlap(&self, a: FieldKey, b: FieldKey) -> (f64, f64) {
        let (Some(ta), Some(tb)) = (self.at(a), self.at(b)) else {
            return (0.0, 0.0);
        };
        if ta.thumbnail.image().is_none() || tb.thumbnail.image().is_none() {
            return (0.0, 0.0);
        }

        (
            1.0 - (ta.pos_x - tb.pos_x).abs() / self.axis_x().length,
            1.0 - (ta.pos_y - tb.pos_y).abs() / self.axis_y().length,
        )
    }

    pub fn edge_overlap(&self, key: FieldKey) -> EdgeOverlap {
        let (fx, fy) = key;
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };

        EdgeOverlap {
            left: clamp(self.overlap(key, (fx - 1, fy)).0),
            right: clamp(self.overlap(key, (fx + 1, fy)).0),
            top: clamp(self.overlap(key, (fx, fy - 1)).1),
            bottom: clamp(self.overlap(key, (fx, fy + 1)).1),
        }
    }
}
