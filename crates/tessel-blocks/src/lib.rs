//! Block item ids, categories and texture tiles.
#![forbid(unsafe_code)]

mod tiles;

pub use tiles::{FaceTiles, block_tiles, plant_tile};

/// Raw voxel value as stored in maps. Negative values are border copies of `|w|`.
pub type BlockId = i8;

pub const EMPTY: BlockId = 0;
pub const GRASS: BlockId = 1;
pub const SAND: BlockId = 2;
pub const STONE: BlockId = 3;
pub const BRICK: BlockId = 4;
pub const WOOD: BlockId = 5;
pub const CEMENT: BlockId = 6;
pub const DIRT: BlockId = 7;
pub const PLANK: BlockId = 8;
pub const SNOW: BlockId = 9;
pub const GLASS: BlockId = 10;
pub const COBBLE: BlockId = 11;
pub const LIGHT_STONE: BlockId = 12;
pub const DARK_STONE: BlockId = 13;
pub const CHEST: BlockId = 14;
pub const LEAVES: BlockId = 15;
pub const CLOUD: BlockId = 16;
pub const TALL_GRASS: BlockId = 17;
pub const YELLOW_FLOWER: BlockId = 18;
pub const RED_FLOWER: BlockId = 19;
pub const PURPLE_FLOWER: BlockId = 20;
pub const SUN_FLOWER: BlockId = 21;
pub const WHITE_FLOWER: BlockId = 22;
pub const BLUE_FLOWER: BlockId = 23;
pub const COLOR_00: BlockId = 32;
pub const COLOR_31: BlockId = 63;

/// Items a builder can place, in palette order.
pub const PLACEABLE: &[BlockId] = &[
    GRASS,
    SAND,
    STONE,
    BRICK,
    WOOD,
    CEMENT,
    DIRT,
    PLANK,
    SNOW,
    GLASS,
    COBBLE,
    LIGHT_STONE,
    DARK_STONE,
    CHEST,
    LEAVES,
    TALL_GRASS,
    YELLOW_FLOWER,
    RED_FLOWER,
    PURPLE_FLOWER,
    SUN_FLOWER,
    WHITE_FLOWER,
    BLUE_FLOWER,
];

#[inline]
fn kind(w: BlockId) -> u8 {
    w.unsigned_abs()
}

/// Crossed-quad vegetation (tall grass and flowers).
#[inline]
pub fn is_plant(w: BlockId) -> bool {
    (TALL_GRASS as u8..=BLUE_FLOWER as u8).contains(&kind(w))
}

#[inline]
pub fn is_obstacle(w: BlockId) -> bool {
    !is_plant(w) && !matches!(kind(w) as i8, EMPTY | CLOUD)
}

/// Cells that neither block light nor hide the faces of their neighbors.
#[inline]
pub fn is_transparent(w: BlockId) -> bool {
    is_plant(w) || matches!(kind(w) as i8, EMPTY | GLASS | LEAVES)
}

#[inline]
pub fn is_destructable(w: BlockId) -> bool {
    !matches!(kind(w) as i8, EMPTY | CLOUD)
}
