//! CPU chunk mesher: neighborhood opacity, flood lighting, corner AO and face emission.
#![forbid(unsafe_code)]

mod constants;
mod emit;
mod face;
mod occlusion;

pub use constants::{FLOATS_PER_FACE, FLOATS_PER_VERTEX, MINY_INIT, PLANT_FACES, VERTS_PER_FACE};
pub use emit::{make_cube, make_plant};
pub use face::Face;
pub use occlusion::{CornerShading, Neighborhood, occlusion};

use std::time::Instant;

use constants::{HALF_VOXEL, SHADE_REACH, SHADE_STEP};
use tessel_blocks::{BlockId, is_plant};
use tessel_lighting::ScratchVolume;
use tessel_map::VoxelMap;
use tessel_world::SimplexNoise;

/// Borrowed 3x3 block and light maps around chunk `(p,q)`, indexed `[dp+1][dq+1]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkNeighborhood<'a> {
    pub p: i32,
    pub q: i32,
    pub blocks: [[Option<&'a VoxelMap>; 3]; 3],
    pub lights: [[Option<&'a VoxelMap>; 3]; 3],
}

impl<'a> ChunkNeighborhood<'a> {
    /// A neighborhood with only the center chunk resident.
    pub fn single(p: i32, q: i32, blocks: &'a VoxelMap, lights: Option<&'a VoxelMap>) -> Self {
        let mut nb = Self {
            p,
            q,
            ..Default::default()
        };
        nb.blocks[1][1] = Some(blocks);
        nb.lights[1][1] = lights;
        nb
    }

    #[inline]
    pub fn center_blocks(&self) -> Option<&'a VoxelMap> {
        self.blocks[1][1]
    }

    /// True if any resident light map holds a live entry.
    pub fn has_lights(&self) -> bool {
        self.lights.iter().flatten().flatten().any(|m| !m.is_empty())
    }
}

/// Per-mesher settings shared by every job.
#[derive(Debug)]
pub struct MeshContext {
    pub show_lights: bool,
    noise: SimplexNoise,
}

impl MeshContext {
    pub fn new(show_lights: bool, seed: i32) -> Self {
        Self {
            show_lights,
            noise: SimplexNoise::new(seed),
        }
    }

    /// Plant spin in degrees for the column at `(x,z)`.
    pub fn plant_rotation(&self, x: i32, z: i32) -> f32 {
        self.noise.simplex2(x as f32, z as f32, 4, 0.5, 2.0) * 360.0
    }
}

/// Interleaved vertex buffer for one chunk plus the height span that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkMesh {
    pub p: i32,
    pub q: i32,
    pub miny: i32,
    pub maxy: i32,
    pub faces: usize,
    pub data: Vec<f32>,
}

impl ChunkMesh {
    pub fn empty(p: i32, q: i32) -> Self {
        Self {
            p,
            q,
            miny: MINY_INIT,
            maxy: 0,
            faces: 0,
            data: Vec::new(),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.data.len() / FLOATS_PER_VERTEX
    }
}

struct Exposed {
    pos: (i32, i32, i32),
    w: BlockId,
    visible: [bool; 6],
}

fn gather(vol: &ScratchVolume, x: i32, y: i32, z: i32) -> Neighborhood {
    let mut n = Neighborhood::default();
    let mut i = 0;
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                let (cx, cy, cz) = (x + dx, y + dy, z + dz);
                n.opaque[i] = vol.is_opaque(cx, cy, cz);
                n.light[i] = vol.light_at(cx, cy, cz);
                if cy <= vol.highest_at(cx, cz) {
                    if let Some(oy) = (0..SHADE_REACH).find(|&oy| vol.is_opaque(cx, cy + oy, cz)) {
                        n.shade[i] = 1.0 - oy as f32 * SHADE_STEP;
                    }
                }
                i += 1;
            }
        }
    }
    n
}

/// Builds the mesh for the center chunk of `nb`.
///
/// Only voxels of the center block map with `w > 0` contribute; border copies and
/// neighbor maps feed opacity and lighting. A missing center map yields an empty mesh.
pub fn compute_chunk(ctx: &MeshContext, nb: &ChunkNeighborhood<'_>) -> ChunkMesh {
    let mut mesh = ChunkMesh::empty(nb.p, nb.q);
    let Some(center) = nb.center_blocks() else {
        return mesh;
    };
    let t0 = Instant::now();
    let mut vol = ScratchVolume::for_chunk(nb.p, nb.q);
    for map in nb.blocks.iter().flatten().flatten() {
        vol.mark_blocks(map);
    }
    if ctx.show_lights && nb.has_lights() {
        for map in nb.lights.iter().flatten().flatten() {
            vol.flood_lights(map);
        }
    }

    let mut exposed = Vec::new();
    for (ex, ey, ez, ew) in center.iter() {
        if ew <= 0 {
            continue;
        }
        let (x, y, z) = vol.to_local(ex, ey, ez);
        let mut visible = [false; 6];
        for f in Face::ALL {
            let (dx, dy, dz) = f.delta();
            visible[f.index()] = !vol.is_opaque(x + dx, y + dy, z + dz);
        }
        visible[Face::Bottom.index()] &= ey > 0;
        let total = visible.iter().filter(|&&v| v).count();
        if total == 0 {
            continue;
        }
        let faces = if is_plant(ew) { PLANT_FACES } else { total };
        mesh.miny = mesh.miny.min(ey);
        mesh.maxy = mesh.maxy.max(ey);
        mesh.faces += faces;
        exposed.push(Exposed {
            pos: (ex, ey, ez),
            w: ew,
            visible,
        });
    }

    mesh.data.reserve_exact(mesh.faces * FLOATS_PER_FACE);
    for e in &exposed {
        let (ex, ey, ez) = e.pos;
        let (x, y, z) = vol.to_local(ex, ey, ez);
        let shading = occlusion(&gather(&vol, x, y, z));
        let at = [ex as f32, ey as f32, ez as f32];
        if is_plant(e.w) {
            let rotation = ctx.plant_rotation(ex, ez);
            make_plant(
                &mut mesh.data,
                shading.min_ao(),
                shading.max_light(),
                at,
                HALF_VOXEL,
                e.w,
                rotation,
            );
        } else {
            make_cube(&mut mesh.data, &shading, e.visible, at, HALF_VOXEL, e.w);
        }
    }
    log::trace!(
        target: "perf",
        "ms={:.2} mesh_chunk p={} q={} voxels={} faces={}",
        t0.elapsed().as_secs_f32() * 1000.0,
        nb.p,
        nb.q,
        exposed.len(),
        mesh.faces
    );
    mesh
}
