mod dirty;
mod tile;
mod tilemap;

pub use dirty::{DirtyExtents, DirtyRect};
pub use tile::{Tile, TileGridPosition, TileIndex, TileIndexRange};
pub use tilemap::{neighbor, TileRuleFn, Tilemap};
