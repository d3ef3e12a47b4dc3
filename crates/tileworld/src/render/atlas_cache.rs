use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::debug;

use super::canvas::{Canvas, Framebuffer};
use super::tileset::Tileset;
use crate::world::Tilemap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AtlasCacheError {
    #[error("tiles-per-page counts must be non-zero, got {x}x{y}")]
    ZeroPageTileCount { x: u32, y: u32 },
}

/// Presents the unbounded, sparse tile grid as a bounded set of fixed-size
/// baked pixel pages, re-baking only the pages touched by the current dirty
/// region.
///
/// Pages cover `tiles_per_page_x x tiles_per_page_y` grid cells each and are
/// keyed by their page coordinate pair. A page is materialised on first
/// reference and dropped once a redraw pass finds no tile mapping into it.
pub struct TileAtlasCache {
    tileset: Tileset,
    tiles_per_page_x: u32,
    tiles_per_page_y: u32,
    pages: HashMap<(i32, i32), Framebuffer>,
}

impl TileAtlasCache {
    pub fn new(
        tileset: Tileset,
        tiles_per_page_x: u32,
        tiles_per_page_y: u32,
    ) -> Result<Self, AtlasCacheError> {
        if tiles_per_page_x == 0 || tiles_per_page_y == 0 {
            return Err(AtlasCacheError::ZeroPageTileCount {
                x: tiles_per_page_x,
                y: tiles_per_page_y,
            });
        }
        Ok(Self {
            tileset,
            tiles_per_page_x,
            tiles_per_page_y,
            pages: HashMap::new(),
        })
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    /// Page coordinate owning grid cell `(x, y)`. Euclidean floor division,
    /// so the mapping stays correct for negative coordinates too.
    pub fn page_of(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.div_euclid(self.tiles_per_page_x as i32),
            y.div_euclid(self.tiles_per_page_y as i32),
        )
    }

    pub fn page_pixel_width(&self) -> u32 {
        self.tiles_per_page_x * self.tileset.tile_width()
    }

    pub fn page_pixel_height(&self) -> u32 {
        self.tiles_per_page_y * self.tileset.tile_height()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Baked pixels of one live page, for tests and GPU-upload collaborators.
    pub fn page(&self, key: (i32, i32)) -> Option<&Framebuffer> {
        self.pages.get(&key)
    }

    pub fn page_keys(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.pages.keys().copied()
    }

    /// Consumes the map's dirty region and re-bakes the pages it touches.
    ///
    /// Returns `false` without doing any work when the dirty region is empty.
    /// Otherwise: clears the dirty sub-rectangle on every live page, runs a
    /// full census of the map (materialising a page for every owned tile and
    /// re-drawing the tiles inside the dirty box), evicts pages that no tile
    /// maps into anymore, and finally resets the map's dirty region.
    pub fn redraw(&mut self, map: &mut Tilemap) -> bool {
        let mask = map.redraw_mask();
        let Some(dirty) = mask.extents() else {
            return false;
        };

        let tile_w = self.tileset.tile_width() as i32;
        let tile_h = self.tileset.tile_height() as i32;
        let page_px_w = self.page_pixel_width();
        let page_px_h = self.page_pixel_height();
        let page_w = page_px_w as i32;
        let page_h = page_px_h as i32;

        // Erase the stale pixels under the dirty box before re-baking.
        let x1 = dirty.min_x * tile_w;
        let y1 = dirty.min_y * tile_h;
        let x2 = (dirty.max_x + 1) * tile_w;
        let y2 = (dirty.max_y + 1) * tile_h;
        for (&(page_x, page_y), page) in self.pages.iter_mut() {
            let offset_x = page_x * page_w;
            let offset_y = page_y * page_h;
            page.clear_rect(x1 - offset_x, y1 - offset_y, x2 - offset_x, y2 - offset_y);
        }

        // Full census: every stored tile keeps its page alive; only tiles
        // inside the dirty box are re-drawn.
        let tiles_per_x = self.tiles_per_page_x as i32;
        let tiles_per_y = self.tiles_per_page_y as i32;
        let tileset = &self.tileset;
        let pages = &mut self.pages;
        let mut live_pages: HashSet<(i32, i32)> = HashSet::with_capacity(pages.len());
        for tile in map.tiles() {
            let page_x = tile.position.x.div_euclid(tiles_per_x);
            let page_y = tile.position.y.div_euclid(tiles_per_y);
            let key = (page_x, page_y);
            let page = pages
                .entry(key)
                .or_insert_with(|| Framebuffer::new(page_px_w, page_px_h));
            live_pages.insert(key);

            if !mask.contains(tile.position.x, tile.position.y) {
                continue;
            }
            let dest_x = tile.position.x * tile_w - page_x * page_w;
            let dest_y = tile.position.y * tile_h - page_y * page_h;
            tileset.draw_tile(
                dest_x,
                dest_y,
                i32::from(tile.index.x),
                i32::from(tile.index.y),
                page,
            );
        }

        let before = pages.len();
        pages.retain(|key, _| live_pages.contains(key));
        let evicted = before - pages.len();
        if evicted > 0 {
            debug!(evicted, remaining = pages.len(), "atlas_cache_pages_evicted");
        }

        map.reset_redraw_mask();
        true
    }

    /// Blits every live page onto `canvas` at its fixed pixel offset.
    pub fn draw<C: Canvas>(&self, canvas: &mut C) {
        let page_w = self.page_pixel_width() as i32;
        let page_h = self.page_pixel_height() as i32;
        for (&(page_x, page_y), page) in &self.pages {
            canvas.draw_image(page_x * page_w, page_y * page_h, page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::{PixelSource, Rgba, TRANSPARENT};
    use crate::world::Tile;

    const TILE_PX: u32 = 4;
    const TILES_PER_PAGE: u32 = 4;

    // 2x2 atlas of solid-color 4x4 tiles.
    fn test_tileset() -> Tileset {
        let mut source = Framebuffer::new(TILE_PX * 2, TILE_PX * 2);
        for y in 0..(TILE_PX * 2) as i32 {
            for x in 0..(TILE_PX * 2) as i32 {
                let index_x = x as u32 / TILE_PX;
                let index_y = y as u32 / TILE_PX;
                source.set_pixel(x, y, atlas_color(index_x as u8, index_y as u8));
            }
        }
        Tileset::new(source, TILE_PX, TILE_PX).expect("valid tile size")
    }

    fn atlas_color(index_x: u8, index_y: u8) -> Rgba {
        [50 + index_x * 80, 50 + index_y * 80, 200, 255]
    }

    fn test_cache() -> TileAtlasCache {
        TileAtlasCache::new(test_tileset(), TILES_PER_PAGE, TILES_PER_PAGE).expect("valid cache")
    }

    fn assert_tile_block(
        page: &Framebuffer,
        local_tile_x: u32,
        local_tile_y: u32,
        expected: Rgba,
    ) {
        for py in 0..TILE_PX {
            for px in 0..TILE_PX {
                let x = local_tile_x * TILE_PX + px;
                let y = local_tile_y * TILE_PX + py;
                assert_eq!(page.pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn rejects_zero_page_tile_counts() {
        assert!(matches!(
            TileAtlasCache::new(test_tileset(), 0, 4),
            Err(AtlasCacheError::ZeroPageTileCount { .. })
        ));
    }

    #[test]
    fn redraw_with_empty_dirty_region_does_nothing() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        assert!(!cache.redraw(&mut map));
        assert_eq!(cache.page_count(), 0);
    }

    #[test]
    fn redraw_is_idempotent_until_the_next_mutation() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        map.insert(Tile::at(1, 1, 0, 0));

        assert!(cache.redraw(&mut map));
        assert!(!cache.redraw(&mut map));

        map.insert(Tile::at(2, 2, 1, 1));
        assert!(cache.redraw(&mut map));
        assert!(!cache.redraw(&mut map));
    }

    #[test]
    fn baked_page_holds_the_tile_pixels_at_the_local_offset() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        map.insert(Tile::at(5, 5, 1, 0));
        assert!(cache.redraw(&mut map));

        let key = cache.page_of(5, 5);
        assert_eq!(key, (1, 1));
        let page = cache.page(key).expect("page materialised");
        // Local offset: (5 mod 4, 5 mod 4) tiles into page (1, 1).
        assert_tile_block(page, 1, 1, atlas_color(1, 0));
        assert_tile_block(page, 0, 0, TRANSPARENT);
    }

    #[test]
    fn updated_index_is_rebaked_in_place() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        map.insert(Tile::at(2, 2, 0, 0));
        cache.redraw(&mut map);

        map.insert(Tile::at(2, 2, 1, 1));
        assert!(cache.redraw(&mut map));
        let page = cache.page(cache.page_of(2, 2)).expect("page still live");
        assert_tile_block(page, 2, 2, atlas_color(1, 1));
    }

    #[test]
    fn tiles_spill_onto_their_own_pages() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        map.insert(Tile::at(0, 0, 0, 0));
        map.insert(Tile::at(9, 2, 1, 0));
        assert!(cache.redraw(&mut map));

        assert_eq!(cache.page_count(), 2);
        let first = cache.page((0, 0)).expect("page (0, 0)");
        assert_tile_block(first, 0, 0, atlas_color(0, 0));
        let second = cache.page((2, 0)).expect("page (2, 0)");
        assert_tile_block(second, 1, 2, atlas_color(1, 0));
    }

    #[test]
    fn page_outside_the_dirty_region_keeps_its_pixels() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        map.insert(Tile::at(0, 0, 0, 0));
        map.insert(Tile::at(9, 0, 1, 1));
        cache.redraw(&mut map);

        // Mutate only the far page; the near page's pixels must survive.
        map.remove(9, 0);
        map.insert(Tile::at(8, 0, 0, 1));
        assert!(cache.redraw(&mut map));

        let near = cache.page((0, 0)).expect("near page");
        assert_tile_block(near, 0, 0, atlas_color(0, 0));
        let far = cache.page((2, 0)).expect("far page");
        assert_tile_block(far, 0, 0, atlas_color(0, 1));
        assert_tile_block(far, 1, 0, TRANSPARENT);
    }

    #[test]
    fn emptied_pages_are_evicted() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        map.insert(Tile::at(5, 5, 0, 0));
        cache.redraw(&mut map);
        assert_eq!(cache.page_count(), 1);

        map.remove(5, 5);
        assert!(cache.redraw(&mut map));
        assert_eq!(cache.page_count(), 0);
        assert!(cache.page((1, 1)).is_none());
    }

    #[test]
    fn removed_tile_leaves_cleared_pixels_behind() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        map.insert(Tile::at(0, 0, 0, 0));
        map.insert(Tile::at(1, 0, 1, 0));
        cache.redraw(&mut map);

        map.remove(1, 0);
        assert!(cache.redraw(&mut map));
        let page = cache.page((0, 0)).expect("page kept by remaining tile");
        assert_tile_block(page, 0, 0, atlas_color(0, 0));
        assert_tile_block(page, 1, 0, TRANSPARENT);
    }

    #[test]
    fn draw_composites_pages_at_their_pixel_offsets() {
        let mut cache = test_cache();
        let mut map = Tilemap::new();
        map.insert(Tile::at(0, 0, 0, 0));
        map.insert(Tile::at(4, 0, 1, 1));
        cache.redraw(&mut map);

        let page_px = TILES_PER_PAGE * TILE_PX;
        let mut canvas = Framebuffer::new(page_px * 2, page_px);
        cache.draw(&mut canvas);

        assert_eq!(canvas.pixel(0, 0), atlas_color(0, 0));
        // Grid (4, 0) lives on page (1, 0), first tile slot.
        assert_eq!(canvas.pixel(page_px, 0), atlas_color(1, 1));
        assert_eq!(canvas.pixel(TILE_PX, 0), TRANSPARENT);
    }

    #[test]
    fn page_mapping_is_pure_and_floor_divided() {
        let cache = test_cache();
        assert_eq!(cache.page_of(0, 0), (0, 0));
        assert_eq!(cache.page_of(3, 3), (0, 0));
        assert_eq!(cache.page_of(4, 0), (1, 0));
        assert_eq!(cache.page_of(-1, -1), (-1, -1));
        assert_eq!(cache.page_pixel_width(), TILES_PER_PAGE * TILE_PX);
        assert_eq!(cache.page_pixel_height(), TILES_PER_PAGE * TILE_PX);
    }
}
