use thiserror::Error;

use super::canvas::{Canvas, Framebuffer, PixelSource};
use crate::world::{Tile, Tilemap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilesetError {
    #[error("tile dimensions must be non-zero, got {tile_width}x{tile_height}")]
    ZeroTileSize { tile_width: u32, tile_height: u32 },
}

/// A source atlas image sliced into a regular grid of
/// `tile_width x tile_height` pixel blocks, addressed by tile index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tileset {
    source: Framebuffer,
    tile_width: u32,
    tile_height: u32,
}

impl Tileset {
    pub fn new(source: Framebuffer, tile_width: u32, tile_height: u32) -> Result<Self, TilesetError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TilesetError::ZeroTileSize {
                tile_width,
                tile_height,
            });
        }
        Ok(Self {
            source,
            tile_width,
            tile_height,
        })
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Number of whole tile columns in the atlas.
    pub fn columns(&self) -> u32 {
        self.source.width() / self.tile_width
    }

    /// Number of whole tile rows in the atlas.
    pub fn rows(&self) -> u32 {
        self.source.height() / self.tile_height
    }

    pub fn source(&self) -> &Framebuffer {
        &self.source
    }

    /// Copies the pixel block for atlas cell `(index_x, index_y)` onto
    /// `canvas` at `(dest_x, dest_y)`, pixel for pixel with no blending.
    /// Negative indices or a block outside the atlas draw nothing.
    pub fn draw_tile<C: Canvas>(
        &self,
        dest_x: i32,
        dest_y: i32,
        index_x: i32,
        index_y: i32,
        canvas: &mut C,
    ) {
        if index_x < 0 || index_y < 0 {
            return;
        }
        let block_x = index_x as u64 * u64::from(self.tile_width);
        let block_y = index_y as u64 * u64::from(self.tile_height);
        if block_x + u64::from(self.tile_width) > u64::from(self.source.width()) {
            return;
        }
        if block_y + u64::from(self.tile_height) > u64::from(self.source.height()) {
            return;
        }
        let src_x = block_x as u32;
        let src_y = block_y as u32;

        for py in 0..self.tile_height {
            for px in 0..self.tile_width {
                let color = self.source.pixel(src_x + px, src_y + py);
                canvas.set_pixel(dest_x + px as i32, dest_y + py as i32, color);
            }
        }
    }

    /// Draws `tile` at its grid position scaled to pixels, shifted by a
    /// caller-supplied pixel origin.
    pub fn draw_map_tile<C: Canvas>(
        &self,
        tile: &Tile,
        origin_x: i32,
        origin_y: i32,
        canvas: &mut C,
    ) {
        self.draw_tile(
            tile.position.x * self.tile_width as i32 - origin_x,
            tile.position.y * self.tile_height as i32 - origin_y,
            i32::from(tile.index.x),
            i32::from(tile.index.y),
            canvas,
        );
    }

    /// Draws every stored tile of `map` onto `canvas`.
    pub fn draw_tiles<C: Canvas>(
        &self,
        map: &Tilemap,
        origin_x: i32,
        origin_y: i32,
        canvas: &mut C,
    ) {
        for tile in map.tiles() {
            self.draw_map_tile(tile, origin_x, origin_y, canvas);
        }
    }
}
