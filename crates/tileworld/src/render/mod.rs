mod atlas_cache;
mod canvas;
mod tileset;

pub use atlas_cache::{AtlasCacheError, TileAtlasCache};
pub use canvas::{Canvas, FrameSlice, Framebuffer, PixelSource, Rgba, TRANSPARENT};
pub use tileset::{Tileset, TilesetError};
