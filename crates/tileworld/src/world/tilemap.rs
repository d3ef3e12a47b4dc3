use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::dirty::DirtyRect;
use super::tile::{Tile, TileGridPosition, TileIndex, TileIndexRange};

/// Bit assignment of the 8-neighbor occupancy mask, one bit per compass
/// direction. North is decreasing `y`.
pub mod neighbor {
    pub const NORTH_WEST: u8 = 0x01;
    pub const NORTH: u8 = 0x02;
    pub const NORTH_EAST: u8 = 0x04;
    pub const WEST: u8 = 0x08;
    pub const EAST: u8 = 0x10;
    pub const SOUTH_WEST: u8 = 0x20;
    pub const SOUTH: u8 = 0x40;
    pub const SOUTH_EAST: u8 = 0x80;
}

/// An auto-tiling rule body: given a tile's current index, its position and a
/// view of the whole map, pick the index the tile should display.
pub type TileRuleFn = dyn Fn(TileIndex, TileGridPosition, &Tilemap) -> TileIndex;

/// Sparse, unbounded grid of tiles with an ordered auto-tiling rule list and
/// an accumulating dirty region.
///
/// Maps are keyed by the `(x, y)` coordinate pair, so distinct cells can never
/// alias regardless of coordinate magnitude.
#[derive(Default)]
pub struct Tilemap {
    tiles: HashMap<(i32, i32), Tile>,
    rules: Vec<(TileIndexRange, Box<TileRuleFn>)>,
    redraw_mask: DirtyRect,
}

impl fmt::Debug for Tilemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tilemap")
            .field("tiles", &self.tiles.len())
            .field("rules", &self.rules.len())
            .field("redraw_mask", &self.redraw_mask)
            .finish()
    }
}

impl Tilemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tile`, replacing any tile already occupying its cell, then runs
    /// rule propagation over the 3x3 neighborhood and dirty-marks the cell.
    ///
    /// Negative positions are silently not stored. Replacing an occupied cell
    /// removes the old tile first, so its own rule pass and dirty mark happen
    /// before the new tile's.
    pub fn insert(&mut self, tile: Tile) {
        let TileGridPosition { x, y } = tile.position;
        if x < 0 || y < 0 {
            debug!(x, y, "tilemap_insert_rejected_negative_position");
            return;
        }

        if self.tiles.contains_key(&(x, y)) {
            self.remove(x, y);
        }
        self.tiles.insert((x, y), tile);

        self.rules_update(x, y);
        self.redraw_mask.mark(x, y);
    }

    /// Erases the tile at `(x, y)` if present, runs rule propagation over the
    /// 3x3 neighborhood and dirty-marks the cell. No-op on an empty cell.
    pub fn remove(&mut self, x: i32, y: i32) {
        if self.tiles.remove(&(x, y)).is_none() {
            return;
        }

        self.rules_update(x, y);
        self.redraw_mask.mark(x, y);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        self.tiles.get(&(x, y)).copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterates every stored tile in unspecified order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Occupancy mask of the 8 cells surrounding `(x, y)`, one bit per
    /// compass direction as assigned in [`neighbor`].
    pub fn neighborhood(&self, x: i32, y: i32) -> u8 {
        let mut mask = 0u8;
        if self.get(x - 1, y - 1).is_some() {
            mask |= neighbor::NORTH_WEST;
        }
        if self.get(x, y - 1).is_some() {
            mask |= neighbor::NORTH;
        }
        if self.get(x + 1, y - 1).is_some() {
            mask |= neighbor::NORTH_EAST;
        }
        if self.get(x - 1, y).is_some() {
            mask |= neighbor::WEST;
        }
        if self.get(x + 1, y).is_some() {
            mask |= neighbor::EAST;
        }
        if self.get(x - 1, y + 1).is_some() {
            mask |= neighbor::SOUTH_WEST;
        }
        if self.get(x, y + 1).is_some() {
            mask |= neighbor::SOUTH;
        }
        if self.get(x + 1, y + 1).is_some() {
            mask |= neighbor::SOUTH_EAST;
        }
        mask
    }

    /// Appends a rule. Rules are evaluated in insertion order and the first
    /// rule whose domain contains a tile's current index wins, so later rules
    /// can be shadowed deliberately.
    pub fn add_rule<F>(&mut self, domain: TileIndexRange, rule: F)
    where
        F: Fn(TileIndex, TileGridPosition, &Tilemap) -> TileIndex + 'static,
    {
        self.rules.push((domain, Box::new(rule)));
    }

    pub fn redraw_mask(&self) -> DirtyRect {
        self.redraw_mask
    }

    pub fn reset_redraw_mask(&mut self) {
        self.redraw_mask.reset();
    }

    fn rule_index(&self, tile: &Tile) -> Option<TileIndex> {
        for (domain, rule) in &self.rules {
            if domain.contains(tile.index) {
                return Some(rule(tile.index, tile.position, self));
            }
        }
        None
    }

    /// Re-evaluates the rules for every tile in the 3x3 window centered on
    /// `(x, y)`, rewriting indices in place and dirty-marking changed cells.
    /// Returns whether any index changed.
    fn rules_update(&mut self, x: i32, y: i32) -> bool {
        if self.rules.is_empty() {
            return false;
        }

        let mut changed = false;
        for iy in -1..=1 {
            for ix in -1..=1 {
                let Some(tile) = self.get(x + ix, y + iy) else {
                    continue;
                };
                let Some(new_index) = self.rule_index(&tile) else {
                    continue;
                };
                if new_index == tile.index {
                    continue;
                }
                if let Some(stored) = self.tiles.get_mut(&(x + ix, y + iy)) {
                    stored.index = new_index;
                }
                self.redraw_mask.mark(x + ix, y + iy);
                changed = true;
            }
        }
        changed
    }
}
