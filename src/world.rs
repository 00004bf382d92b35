/// Result of looking up a grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall(u8),
    OutOfBounds,
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Reference 8x8 level, indexed `[y][x]`.
pub const REFERENCE_MAP: [[u8; 8]; 8] = [
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 3, 0, 0, 3, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 2, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 4, 0, 0, 1],
    [1, 0, 3, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
];

/// Row-major grid of tile codes. 0 is open floor, anything else is a wall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<u8>,
}

impl TileGrid {
    pub fn from_rows<const W: usize>(rows: &[[u8; W]]) -> Self {
        Self {
            width: W,
            height: rows.len(),
            tiles: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn reference() -> Self {
        Self::from_rows(&REFERENCE_MAP)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bounds-checked lookup by integer cell coordinates.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Cell::OutOfBounds;
        }
        match self.tiles[y as usize * self.width + x as usize] {
            0 => Cell::Empty,
            code => Cell::Wall(code),
        }
    }

    /// Lookup by world coordinates, truncating toward zero.
    /// Negative and non-finite coordinates are out of bounds.
    #[inline]
    pub fn cell_at(&self, x: f32, y: f32) -> Cell {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return Cell::OutOfBounds;
        }
        // Saturating float->int cast keeps huge values out of bounds.
        self.cell(x as i32, y as i32)
    }

    /// True when every edge cell is a wall, which guarantees that rays starting
    /// inside the grid terminate on a tile.
    pub fn has_solid_border(&self) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let (w, h) = (self.width as i32, self.height as i32);
        let solid = |x, y| matches!(self.cell(x, y), Cell::Wall(_));
        (0..w).all(|x| solid(x, 0) && solid(x, h - 1))
            && (0..h).all(|y| solid(0, y) && solid(w - 1, y))
    }
}
