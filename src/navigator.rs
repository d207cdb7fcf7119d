/// Selection navigation
///
/// Resolves pointer clicks, arrow-key steps and "next" into a tile index.
/// `None` means the input does not select anything and the caller must
/// leave the selection alone.

use crate::grid::TileGrid;

/// Tile whose center is nearest to a display-space point.
///
/// Linear scan over every tile; ties go to the earliest tile in parse
/// order. Fine for scans of a few thousand fields, a grid hash would be
/// needed beyond that.
pub fn nearest_tile(grid: &TileGrid, x: f64, y: f64) -> Option<usize> {
    let scale = grid.scale();
    if grid.is_empty() || scale <= 0.0 {
        return None;
    }
    let (px, py) = (x / scale, y / scale);

    let mut nearest = None;
    let mut nearest_distance = f64::INFINITY;
    for index in 0..grid.len() {
        let Some((cx, cy)) = grid.tile_center(index) else {
            continue;
        };
        let distance = (cx - px).hypot(cy - py);
        if distance < nearest_distance {
            nearest_distance = distance;
            nearest = Some(index);
        }
    }
    nearest
}

/// Field-adjacent neighbor of `current`, offset by (dx, dy) field units
pub fn neighbor(grid: &TileGrid, current: usize, dx: i32, dy: i32) -> Option<usize> {
    let tile = grid.tile(current)?;
    grid.index_of((tile.field_x + dx, tile.field_y + dy))
}

/// Next tile in parse order, clamped to the last one
pub fn advance(grid: &TileGrid, current: usize) -> Option<usize> {
    if grid.is_empty() {
        return None;
    }
    Some((current + 1).min(grid.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::grid_of;

    fn two_by_two() -> TileGrid {
        let mut grid = grid_of(
            &[(0, 0, 0.0, 0.0), (1, 0, 1.0, 0.0), (0, 1, 0.0, 1.0), (1, 1, 1.0, 1.0)],
            1.0,
        );
        grid.fit_to_viewport(200.0, 200.0);
        grid
    }

    #[test]
    fn test_click_selects_nearest_center() {
        let grid = two_by_two();
        let scale = grid.scale();

        // Centers sit half a tile in from each position: 0.5 and 1.5
        assert_eq!(nearest_tile(&grid, 0.9 * scale, 0.9 * scale), Some(0));
        assert_eq!(nearest_tile(&grid, 1.1 * scale, 1.1 * scale), Some(3));
        assert_eq!(nearest_tile(&grid, 1.9 * scale, 0.1 * scale), Some(1));
    }

    #[test]
    fn test_click_with_small_tiles() {
        let mut grid = grid_of(
            &[(0, 0, 0.0, 0.0), (1, 0, 1.0, 0.0), (0, 1, 0.0, 1.0), (1, 1, 1.0, 1.0)],
            0.5,
        );
        grid.fit_to_viewport(300.0, 300.0);
        let scale = grid.scale();

        let selected = nearest_tile(&grid, 0.9 * scale, 0.9 * scale).unwrap();
        assert_eq!(grid.tile(selected).unwrap().field(), (1, 1));
    }

    #[test]
    fn test_click_tie_goes_to_first_tile() {
        let grid = two_by_two();
        let scale = grid.scale();

        // Dead center of the mosaic is equidistant from all four
        assert_eq!(nearest_tile(&grid, 1.0 * scale, 1.0 * scale), Some(0));
    }

    #[test]
    fn test_click_on_empty_or_unfitted_grid() {
        assert_eq!(nearest_tile(&TileGrid::default(), 1.0, 1.0), None);

        let unfitted = grid_of(&[(0, 0, 0.0, 0.0)], 1.0);
        assert_eq!(nearest_tile(&unfitted, 1.0, 1.0), None);
    }

    #[test]
    fn test_move_and_inverse_move() {
        let grid = two_by_two();

        let right = neighbor(&grid, 0, 1, 0).unwrap();
        assert_eq!(right, 1);
        assert_eq!(neighbor(&grid, right, -1, 0), Some(0));

        let down = neighbor(&grid, 1, 0, 1).unwrap();
        assert_eq!(down, 3);
        assert_eq!(neighbor(&grid, down, 0, -1), Some(1));
    }

    #[test]
    fn test_move_off_grid() {
        let grid = two_by_two();

        assert_eq!(neighbor(&grid, 0, -1, 0), None);
        assert_eq!(neighbor(&grid, 3, 0, 1), None);
        assert_eq!(neighbor(&TileGrid::default(), 0, 1, 0), None);
    }

    #[test]
    fn test_advance_clamps() {
        let grid = two_by_two();

        assert_eq!(advance(&grid, 0), Some(1));
        assert_eq!(advance(&grid, 3), Some(3));
        assert_eq!(advance(&TileGrid::default(), 0), None);
    }
}
