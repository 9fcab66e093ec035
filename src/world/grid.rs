//! Tile grid
//!
//! The 2D array of cell states backing one dungeon tier. Dimensions are
//! fixed for the whole session and never change across tiers.

use super::tile::TileKind;

/// A fixed-size 2D grid of tile states
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: i32,
    height: i32,
    cells: Vec<TileKind>,
}

impl TileGrid {
    /// Create a new grid filled with walls
    pub fn new(width: i32, height: i32) -> Self {
        let cells = vec![TileKind::Wall; (width * height).max(0) as usize];
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    pub fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Convert 1D index to 2D coordinates
    #[inline]
    pub fn idx_to_xy(&self, idx: usize) -> (i32, i32) {
        let idx = idx as i32;
        (idx % self.width, idx / self.width)
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Get the tile state at a position
    pub fn get(&self, x: i32, y: i32) -> Option<TileKind> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.xy_to_idx(x, y)])
        } else {
            None
        }
    }

    /// Set the tile state at a position (out of bounds is a no-op)
    pub fn set(&mut self, x: i32, y: i32, kind: TileKind) {
        if self.in_bounds(x, y) {
            let idx = self.xy_to_idx(x, y);
            self.cells[idx] = kind;
        }
    }

    /// Check if a position is walkable
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map_or(false, |t| t.is_walkable())
    }

    /// Number of floor cells
    pub fn floor_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_walkable()).count()
    }

    /// Iterate over all cells with their coordinates
    pub fn iter_cells(&self) -> impl Iterator<Item = (i32, i32, TileKind)> + '_ {
        self.cells.iter().enumerate().map(|(idx, kind)| {
            let (x, y) = self.idx_to_xy(idx);
            (x, y, *kind)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_walls() {
        let grid = TileGrid::new(10, 8);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 8);
        assert_eq!(grid.floor_count(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = TileGrid::new(10, 10);
        grid.set(3, 4, TileKind::Floor);
        assert_eq!(grid.get(3, 4), Some(TileKind::Floor));
        assert!(grid.is_walkable(3, 4));
        assert!(!grid.is_walkable(4, 3));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = TileGrid::new(5, 5);
        grid.set(-1, 0, TileKind::Floor);
        grid.set(5, 5, TileKind::Floor);
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(5, 5), None);
        assert_eq!(grid.floor_count(), 0);
    }

    #[test]
    fn test_idx_roundtrip() {
        let grid = TileGrid::new(7, 3);
        let idx = grid.xy_to_idx(4, 2);
        assert_eq!(grid.idx_to_xy(idx), (4, 2));
    }
}
