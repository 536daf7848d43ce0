use tessel_map::{BLOCK_MAP_MASK, LIGHT_MAP_MASK, VoxelMap};
use tessel_mesh_cpu::{ChunkMesh, ChunkNeighborhood, MeshContext, compute_chunk};

/// Fills a chunk's block and light maps from wherever chunk content comes from.
pub trait ChunkLoader: Send + Sync {
    fn load(&self, p: i32, q: i32, blocks: &mut VoxelMap, lights: &mut VoxelMap);
}

impl<F> ChunkLoader for F
where
    F: Fn(i32, i32, &mut VoxelMap, &mut VoxelMap) + Send + Sync,
{
    fn load(&self, p: i32, q: i32, blocks: &mut VoxelMap, lights: &mut VoxelMap) {
        self(p, q, blocks, lights)
    }
}

/// A by-value meshing job: owned 3x3 snapshots in, mesh out.
#[derive(Clone, Debug)]
pub struct WorkerItem {
    pub p: i32,
    pub q: i32,
    /// Ask the loader to fill the center snapshots before meshing.
    pub load: bool,
    pub blocks: [[Option<VoxelMap>; 3]; 3],
    pub lights: [[Option<VoxelMap>; 3]; 3],
    pub mesh: Option<ChunkMesh>,
}

impl WorkerItem {
    pub fn new(p: i32, q: i32, load: bool) -> Self {
        Self {
            p,
            q,
            load,
            blocks: Default::default(),
            lights: Default::default(),
            mesh: None,
        }
    }

    pub fn neighborhood(&self) -> ChunkNeighborhood<'_> {
        let mut nb = ChunkNeighborhood {
            p: self.p,
            q: self.q,
            ..Default::default()
        };
        for a in 0..3 {
            for b in 0..3 {
                nb.blocks[a][b] = self.blocks[a][b].as_ref();
                nb.lights[a][b] = self.lights[a][b].as_ref();
            }
        }
        nb
    }
}

/// Loads (when asked) and meshes one item. Runs on worker threads and inline for
/// synchronous meshing.
pub fn process_item(ctx: &MeshContext, loader: &dyn ChunkLoader, mut item: WorkerItem) -> WorkerItem {
    if item.load {
        let (p, q) = (item.p, item.q);
        let blocks =
            item.blocks[1][1].get_or_insert_with(|| VoxelMap::for_chunk(p, q, BLOCK_MAP_MASK));
        let lights =
            item.lights[1][1].get_or_insert_with(|| VoxelMap::for_chunk(p, q, LIGHT_MAP_MASK));
        loader.load(p, q, blocks, lights);
    }
    item.mesh = Some(compute_chunk(ctx, &item.neighborhood()));
    item
}
