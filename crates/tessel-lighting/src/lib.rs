//! Dense scratch volume over a 3x3 chunk neighborhood and flood-fill lighting.
#![forbid(unsafe_code)]

use tessel_blocks::is_transparent;
use tessel_map::{CHUNK_SIZE, VoxelMap};

/// Horizontal extent: three chunks plus a one-voxel rim on each side.
pub const XZ_SIZE: usize = CHUNK_SIZE as usize * 3 + 2;
/// First local x/z of the center chunk's bordered span.
pub const XZ_LO: i32 = CHUNK_SIZE;
/// Last local x/z of the center chunk's bordered span.
pub const XZ_HI: i32 = CHUNK_SIZE * 2 + 1;
/// Vertical extent: 256 world rows plus one below and one above.
pub const Y_SIZE: usize = 258;
pub const MAX_LIGHT: u8 = 15;

const VOLUME: usize = XZ_SIZE * XZ_SIZE * Y_SIZE;

#[inline]
fn xyz(x: usize, y: usize, z: usize) -> usize {
    (y * XZ_SIZE + x) * XZ_SIZE + z
}

#[inline]
fn xz(x: usize, z: usize) -> usize {
    x * XZ_SIZE + z
}

/// Per-job scratch state. Local coordinates are `world - origin`.
pub struct ScratchVolume {
    ox: i32,
    oy: i32,
    oz: i32,
    opaque: Vec<bool>,
    light: Vec<u8>,
    highest: Vec<u16>,
}

impl ScratchVolume {
    /// Volume centered on chunk `(p,q)`: origin one chunk plus one voxel back on x/z, y at -1.
    pub fn for_chunk(p: i32, q: i32) -> Self {
        Self::with_origin(
            p * CHUNK_SIZE - CHUNK_SIZE - 1,
            -1,
            q * CHUNK_SIZE - CHUNK_SIZE - 1,
        )
    }

    pub fn with_origin(ox: i32, oy: i32, oz: i32) -> Self {
        Self {
            ox,
            oy,
            oz,
            opaque: vec![false; VOLUME],
            light: vec![0; VOLUME],
            highest: vec![0; XZ_SIZE * XZ_SIZE],
        }
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32, i32) {
        (self.ox, self.oy, self.oz)
    }

    /// World to local coordinates (unchecked).
    #[inline]
    pub fn to_local(&self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        (x - self.ox, y - self.oy, z - self.oz)
    }

    #[inline]
    fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&v| v < XZ_SIZE)?;
        let y = usize::try_from(y).ok().filter(|&v| v < Y_SIZE)?;
        let z = usize::try_from(z).ok().filter(|&v| v < XZ_SIZE)?;
        Some(xyz(x, y, z))
    }

    /// Opacity at a local cell; outside the volume reads as open.
    #[inline]
    pub fn is_opaque(&self, x: i32, y: i32, z: i32) -> bool {
        Self::index(x, y, z).is_some_and(|i| self.opaque[i])
    }

    #[inline]
    pub fn light_at(&self, x: i32, y: i32, z: i32) -> u8 {
        Self::index(x, y, z).map_or(0, |i| self.light[i])
    }

    /// Highest local y holding an opaque voxel in column `(x,z)`, 0 if none.
    #[inline]
    pub fn highest_at(&self, x: i32, z: i32) -> i32 {
        match (usize::try_from(x), usize::try_from(z)) {
            (Ok(x), Ok(z)) if x < XZ_SIZE && z < XZ_SIZE => i32::from(self.highest[xz(x, z)]),
            _ => 0,
        }
    }

    /// Records opacity and column heights for every entry of `map` that falls inside.
    pub fn mark_blocks(&mut self, map: &VoxelMap) {
        for (ex, ey, ez, ew) in map.iter() {
            let (x, y, z) = self.to_local(ex, ey, ez);
            let Some(i) = Self::index(x, y, z) else {
                continue;
            };
            let opaque = !is_transparent(ew);
            self.opaque[i] = opaque;
            if opaque {
                let col = xz(x as usize, z as usize);
                self.highest[col] = self.highest[col].max(y as u16);
            }
        }
    }

    /// Seeds a flood fill from every entry of `map`.
    pub fn flood_lights(&mut self, map: &VoxelMap) {
        for (ex, ey, ez, ew) in map.iter() {
            let (x, y, z) = self.to_local(ex, ey, ez);
            self.fill_light(x, y, z, i32::from(ew), true);
        }
    }

    /// Spreads intensity `w` from local `(x,y,z)`, losing one per step.
    ///
    /// A cell is entered only while it holds less than the incoming intensity and is
    /// not opaque; `force` lets the source cell itself be opaque. Cells that cannot
    /// reach the center chunk span with their remaining intensity are skipped.
    pub fn fill_light(&mut self, x: i32, y: i32, z: i32, w: i32, force: bool) {
        let mut stack = vec![(x, y, z, w.min(i32::from(MAX_LIGHT)), force)];
        while let Some((x, y, z, w, force)) = stack.pop() {
            if x + w < XZ_LO || z + w < XZ_LO {
                continue;
            }
            if x - w > XZ_HI || z - w > XZ_HI {
                continue;
            }
            let Some(i) = Self::index(x, y, z) else {
                continue;
            };
            if i32::from(self.light[i]) >= w {
                continue;
            }
            if !force && self.opaque[i] {
                continue;
            }
            self.light[i] = w as u8;
            let w = w - 1;
            stack.extend_from_slice(&[
                (x, y, z + 1, w, false),
                (x, y, z - 1, w, false),
                (x, y + 1, z, w, false),
                (x, y - 1, z, w, false),
                (x + 1, y, z, w, false),
                (x - 1, y, z, w, false),
            ]);
        }
    }
}
