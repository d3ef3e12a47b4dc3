/// Signed grid coordinate of a tile cell. The grid is unbounded in principle;
/// `Tilemap::insert` only stores non-negative positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGridPosition {
    pub x: i32,
    pub y: i32,
}

impl TileGridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Selects one cell inside a source atlas, column `x`, row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub x: u8,
    pub y: u8,
}

impl TileIndex {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Inclusive axis-aligned box over `TileIndex` space. Rules use this to
/// classify which family a tile's current index belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileIndexRange {
    pub x1: u8,
    pub y1: u8,
    pub x2: u8,
    pub y2: u8,
}

impl TileIndexRange {
    pub fn new(x1: u8, y1: u8, x2: u8, y2: u8) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn single(index: TileIndex) -> Self {
        Self::new(index.x, index.y, index.x, index.y)
    }

    pub fn contains(&self, index: TileIndex) -> bool {
        index.x >= self.x1 && index.x <= self.x2 && index.y >= self.y1 && index.y <= self.y2
    }
}

impl From<(TileIndex, TileIndex)> for TileIndexRange {
    fn from((a, b): (TileIndex, TileIndex)) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }
}

/// One occupied grid cell: where it sits and which atlas cell it shows.
/// Copied into and out of storage by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub position: TileGridPosition,
    pub index: TileIndex,
}

impl Tile {
    pub fn new(position: TileGridPosition, index: TileIndex) -> Self {
        Self { position, index }
    }

    pub fn at(grid_x: i32, grid_y: i32, index_x: u8, index_y: u8) -> Self {
        Self {
            position: TileGridPosition::new(grid_x, grid_y),
            index: TileIndex::new(index_x, index_y),
        }
    }
}
