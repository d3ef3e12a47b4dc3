//! Sparse, unbounded 2D tile-world engine.
//!
//! A [`Tilemap`] stores tiles on an unbounded grid, rewrites their atlas
//! indices through ordered adjacency rules, and accumulates a dirty region
//! over every mutation. A [`TileAtlasCache`] consumes that dirty region once
//! per frame, baking tile pixels from a [`Tileset`] atlas into fixed-size
//! pages that a rendering backend blits or uploads. The per-frame contract is
//! mutate, then [`TileAtlasCache::redraw`], then [`TileAtlasCache::draw`].

pub mod content;
pub mod render;
pub mod world;

pub use content::{load_tileset, read_manifest, ManifestError, TilesetManifest};
pub use render::{
    AtlasCacheError, Canvas, FrameSlice, Framebuffer, PixelSource, Rgba, TileAtlasCache, Tileset,
    TilesetError, TRANSPARENT,
};
pub use world::{
    neighbor, DirtyExtents, DirtyRect, Tile, TileGridPosition, TileIndex, TileIndexRange,
    TileRuleFn, Tilemap,
};
