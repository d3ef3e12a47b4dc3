use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;
use tileworld::{
    neighbor, AtlasCacheError, Canvas, Framebuffer, Rgba, Tile, TileAtlasCache, TileIndex,
    TileIndexRange, Tilemap, Tileset, TilesetError,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const TILE_PX: u32 = 16;
const VARIANT_COUNT: u32 = 7;
const TILES_PER_PAGE: u32 = 8;
const OUTPUT_ENV_VAR: &str = "TILEWORLD_DEMO_OUTPUT";
const DEFAULT_OUTPUT: &str = "tileworld_demo.png";
const BACKGROUND_COLOR: Rgba = [20, 22, 28, 255];
const CARDINALS: u8 = neighbor::NORTH | neighbor::EAST | neighbor::SOUTH | neighbor::WEST;

#[derive(Debug, Error)]
enum DemoError {
    #[error("tileset construction failed: {0}")]
    Tileset(#[from] TilesetError),
    #[error("atlas cache construction failed: {0}")]
    AtlasCache(#[from] AtlasCacheError),
    #[error("failed to write output image: {0}")]
    WriteImage(#[from] image::ImageError),
}

fn main() -> ExitCode {
    init_tracing();
    info!("=== Tileworld Demo ===");

    if let Err(err) = run() {
        error!(error = %err, "demo_failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<(), DemoError> {
    let tileset = Tileset::new(paint_atlas(), TILE_PX, TILE_PX)?;
    let mut cache = TileAtlasCache::new(tileset, TILES_PER_PAGE, TILES_PER_PAGE)?;
    let mut map = build_world();

    // Frame 1: bake the freshly stamped island.
    cache.redraw(&mut map);
    info!(tiles = map.len(), pages = cache.page_count(), "island_baked");

    // Frame 2: carve a hole; only the touched pages are re-baked and the
    // surrounding tiles pick up their new edge variants.
    for (x, y) in [(6, 3), (7, 3), (6, 4), (7, 4)] {
        map.remove(x, y);
    }
    cache.redraw(&mut map);
    info!(tiles = map.len(), pages = cache.page_count(), "hole_carved");

    let mut frame = Framebuffer::new(
        cache.page_pixel_width() * 2,
        cache.page_pixel_height(),
    );
    frame.fill(BACKGROUND_COLOR);
    cache.draw(&mut frame);

    let output = output_path();
    image::save_buffer(
        &output,
        frame.data(),
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    info!(path = %output.display(), "frame_written");
    Ok(())
}

/// One-row atlas of solid-color variant tiles with a darker one-pixel border,
/// painted in place of a shipped asset file.
fn paint_atlas() -> Framebuffer {
    let mut atlas = Framebuffer::new(VARIANT_COUNT * TILE_PX, TILE_PX);
    for column in 0..VARIANT_COUNT {
        let fill = variant_color(column as u8);
        let border = [fill[0] / 2, fill[1] / 2, fill[2] / 2, 255];
        for py in 0..TILE_PX {
            for px in 0..TILE_PX {
                let on_border = px == 0 || py == 0 || px == TILE_PX - 1 || py == TILE_PX - 1;
                let color = if on_border { border } else { fill };
                atlas.set_pixel((column * TILE_PX + px) as i32, py as i32, color);
            }
        }
    }
    atlas
}

fn variant_color(column: u8) -> Rgba {
    [60 + column * 25, 140, 200 - column * 20, 255]
}

fn build_world() -> Tilemap {
    let mut map = Tilemap::new();
    map.add_rule(
        TileIndexRange::new(0, 0, (VARIANT_COUNT - 1) as u8, 0),
        |_, position, view| variant_for_mask(view.neighborhood(position.x, position.y)),
    );

    // A 10x4 island spanning two atlas pages.
    for y in 2..6 {
        for x in 2..12 {
            map.insert(Tile::at(x, y, 0, 0));
        }
    }
    map
}

/// Surrounded tiles show variant 1; everything else picks a variant from its
/// occupied cardinal-neighbor count.
fn variant_for_mask(mask: u8) -> TileIndex {
    if mask == 0xFF {
        TileIndex::new(1, 0)
    } else {
        TileIndex::new(2 + (mask & CARDINALS).count_ones() as u8, 0)
    }
}

fn output_path() -> PathBuf {
    std::env::var(OUTPUT_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT))
}
