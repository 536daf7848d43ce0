//! Shared constants for tessel-mesh-cpu.

/// position xyz, normal xyz, uv, ao, light
pub const FLOATS_PER_VERTEX: usize = 10;
pub const VERTS_PER_FACE: usize = 6;
pub const FLOATS_PER_FACE: usize = FLOATS_PER_VERTEX * VERTS_PER_FACE;

/// Faces emitted for a plant regardless of exposure.
pub const PLANT_FACES: usize = 4;

/// Half extent of a unit voxel.
pub(crate) const HALF_VOXEL: f32 = 0.5;

// Atlas: 16x16 tiles
pub(crate) const ATLAS_TILES_PER_ROW: u16 = 16;
pub(crate) const TILE_SIZE: f32 = 0.0625;
/// Cube uvs are inset half a texel so neighboring tiles never bleed in.
pub(crate) const TILE_INSET: f32 = 1.0 / 2048.0;

pub(crate) const AO_CURVE: [f32; 4] = [0.0, 0.25, 0.5, 0.75];
/// Shade looks this many cells up a column.
pub(crate) const SHADE_REACH: i32 = 8;
pub(crate) const SHADE_STEP: f32 = 0.125;

/// Corner light sum forced for a voxel sitting in a full-intensity light cell.
pub(crate) const LIGHT_SOURCE_SUM: f32 = 15.0 * 4.0 * 10.0;

/// Center index of the 27-cell neighborhood.
pub(crate) const CENTER: usize = 13;

/// Highest `miny` a mesh reports before any voxel contributes.
pub const MINY_INIT: i32 = 256;
