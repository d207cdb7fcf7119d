/// Minimap compositor
///
/// Paints, in order:
/// 1. a translucent background over the whole surface
/// 2. every tile in parse order: an outline while its thumbnail is missing,
///    otherwise the thumbnail with half of each overlapped edge trimmed away
/// 3. a border around the surface
/// 4. the selected tile's full rectangle
///
/// Trimming means two overlapping neighbors each give up half of the shared
/// strip, which hides most of the vignetting at tile edges.

use image::{Rgba, RgbaImage};

use crate::grid::{DisplayRect, EdgeOverlap, TileGrid};
use crate::minimap::Minimap;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 128]);
const PLACEHOLDER: Rgba<u8> = Rgba([100, 100, 100, 255]);
const BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);
const HIGHLIGHT: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Where a trimmed thumbnail goes and which part of it is sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crop {
    /// Display-space destination
    pub destination: DisplayRect,
    /// Region of the thumbnail, in thumbnail pixels
    pub source: DisplayRect,
}

/// Shrink a tile's rectangle and its thumbnail sampling region by half the
/// overlap on each side
pub fn crop(rect: DisplayRect, thumb_width: u32, thumb_height: u32, edges: EdgeOverlap) -> Crop {
    let (tw, th) = (thumb_width as f64, thumb_height as f64);

    Crop {
        destination: DisplayRect {
            x: rect.x + edges.left * rect.width / 2.0,
            y: rect.y + edges.top * rect.height / 2.0,
            width: rect.width - (edges.left + edges.right) * rect.width / 2.0,
            height: rect.height - (edges.top + edges.bottom) * rect.height / 2.0,
        },
        source: DisplayRect {
            x: edges.left * tw / 2.0,
            y: edges.top * th / 2.0,
            width: tw - (edges.left + edges.right) * tw / 2.0,
            height: th - (edges.top + edges.bottom) * th / 2.0,
        },
    }
}

/// Render the minimap at its fitted width and the viewport height
pub fn render(minimap: &Minimap) -> RgbaImage {
    let width = minimap.display_width().ceil().max(1.0) as u32;
    let height = minimap.viewport_height().ceil().max(1.0) as u32;
    render_grid(minimap.grid(), minimap.selected_index(), width, height)
}

pub fn render_grid(grid: &TileGrid, selected: Option<usize>, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

    for (index, tile) in grid.tiles().iter().enumerate() {
        let Some(rect) = grid.tile_rect(index) else {
            continue;
        };
        match tile.thumbnail.image() {
            None => stroke_rect(&mut canvas, rect, PLACEHOLDER),
            Some(thumbnail) => {
                let edges = grid.edge_overlap(tile.field());
                let crop = crop(rect, thumbnail.width(), thumbnail.height(), edges);
                blit(&mut canvas, thumbnail, crop);
            }
        }
    }

    let frame = DisplayRect {
        x: 0.0,
        y: 0.0,
        width: width.saturating_sub(1) as f64,
        height: height.saturating_sub(1) as f64,
    };
    stroke_rect(&mut canvas, frame, BORDER);

    if let Some(rect) = selected.and_then(|i| grid.tile_rect(i)) {
        stroke_rect(&mut canvas, rect, HIGHLIGHT);
    }

    canvas
}

/// Draw the source region of `thumbnail` scaled into the destination.
///
/// The destination origin is floored and its extent ceiled so adjacent
/// trimmed tiles leave no sub-pixel gaps. Sampling is nearest-neighbor.
fn blit(canvas: &mut RgbaImage, thumbnail: &RgbaImage, crop: Crop) {
    let Crop { destination, source } = crop;
    if thumbnail.width() == 0 || thumbnail.height() == 0 {
        return;
    }

    let x0 = destination.x.floor() as i64;
    let y0 = destination.y.floor() as i64;
    let w = destination.width.ceil().max(0.0) as i64;
    let h = destination.height.ceil().max(0.0) as i64;
    if w == 0 || h == 0 {
        return;
    }

    let max_sx = (thumbnail.width() - 1) as f64;
    let max_sy = (thumbnail.height() - 1) as f64;

    for dy in 0..h {
        let sy = (source.y + (dy as f64 + 0.5) * source.height / h as f64).clamp(0.0, max_sy);
        for dx in 0..w {
            let sx = (source.x + (dx as f64 + 0.5) * source.width / w as f64).clamp(0.0, max_sx);
            let pixel = *thumbnail.get_pixel(sx as u32, sy as u32);
            put(canvas, x0 + dx, y0 + dy, pixel);
        }
    }
}

/// One-pixel outline from (x, y) to (x + width, y + height), inclusive
fn stroke_rect(canvas: &mut RgbaImage, rect: DisplayRect, color: Rgba<u8>) {
    let x0 = rect.x.round() as i64;
    let y0 = rect.y.round() as i64;
    let x1 = (rect.x + rect.width).round() as i64;
    let y1 = (rect.y + rect.height).round() as i64;

    for x in x0..=x1 {
        put(canvas, x, y0, color);
        put(canvas, x, y1, color);
    }
    for y in y0..=y1 {
        put(canvas, x0, y, color);
        put(canvas, x1, y, color);
    }
}

fn put(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    canvas.put_pixel(x as u32, y as u32, color);
}
