use tessel_map::{BLOCK_MAP_MASK, LIGHT_MAP_MASK, VoxelMap};
use tessel_mesh_cpu::{ChunkMesh, MINY_INIT};

use crate::sign::SignList;

/// A resident chunk column: live maps owned by the session plus its latest mesh.
#[derive(Debug)]
pub struct Chunk {
    pub p: i32,
    pub q: i32,
    pub blocks: VoxelMap,
    pub lights: VoxelMap,
    pub signs: SignList,
    /// Mesh is stale relative to the maps.
    pub dirty: bool,
    pub mesh: Option<ChunkMesh>,
    pub faces: usize,
    pub miny: i32,
    pub maxy: i32,
}

impl Chunk {
    pub fn new(p: i32, q: i32) -> Self {
        Self {
            p,
            q,
            blocks: VoxelMap::for_chunk(p, q, BLOCK_MAP_MASK),
            lights: VoxelMap::for_chunk(p, q, LIGHT_MAP_MASK),
            signs: SignList::default(),
            dirty: true,
            mesh: None,
            faces: 0,
            miny: MINY_INIT,
            maxy: 0,
        }
    }

    /// Chebyshev distance in chunks to `(p,q)`.
    #[inline]
    pub fn distance(&self, p: i32, q: i32) -> i32 {
        (self.p - p).abs().max((self.q - q).abs())
    }

    pub fn apply_mesh(&mut self, mesh: ChunkMesh) {
        self.miny = mesh.miny;
        self.maxy = mesh.maxy;
        self.faces = mesh.faces;
        self.mesh = Some(mesh);
    }

    #[inline]
    pub fn is_meshed(&self) -> bool {
        self.mesh.is_some()
    }
}
