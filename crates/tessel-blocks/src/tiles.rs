use crate::{BlockId, CLOUD, COLOR_00, COLOR_31, GRASS, LEAVES, SAND, SNOW, WOOD, is_plant};

/// Atlas tile per cube face: left, right, top, bottom, front, back.
pub type FaceTiles = [u16; 6];

const fn uniform(t: u16) -> FaceTiles {
    [t; 6]
}

/// Atlas tiles for a cube of kind `|w|`. Tiles index a 16x16 atlas.
pub fn block_tiles(w: BlockId) -> FaceTiles {
    let k = w.unsigned_abs() as i16;
    match k {
        k if k == GRASS as i16 => [16, 16, 32, 0, 16, 16],
        k if k == WOOD as i16 => [20, 20, 36, 4, 20, 20],
        k if k == SNOW as i16 => [24, 24, 40, 8, 24, 24],
        k if k >= SAND as i16 && k <= LEAVES as i16 => uniform((k - 1) as u16),
        k if k == CLOUD as i16 => uniform(15),
        k if k >= COLOR_00 as i16 && k <= COLOR_31 as i16 => {
            uniform(176 + (k - COLOR_00 as i16) as u16)
        }
        _ => uniform(0),
    }
}

/// Atlas tile for a plant of kind `|w|`, 0 for non-plants.
pub fn plant_tile(w: BlockId) -> u16 {
    if is_plant(w) {
        48 + (w.unsigned_abs() as u16 - 17)
    } else {
        0
    }
}
