use std::sync::Arc;

use tessel_map::VoxelMap;
use tessel_persist::DurableStore;
use tessel_runtime::ChunkLoader;
use tessel_world::{TerrainConfig, TerrainGenerator};

/// Generated terrain with stored edits laid over it.
pub struct WorldLoader {
    terrain: TerrainGenerator,
    store: Arc<dyn DurableStore>,
}

impl WorldLoader {
    pub fn new(terrain: TerrainConfig, store: Arc<dyn DurableStore>) -> Self {
        Self {
            terrain: TerrainGenerator::new(terrain),
            store,
        }
    }

    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }
}

impl ChunkLoader for WorldLoader {
    fn load(&self, p: i32, q: i32, blocks: &mut VoxelMap, lights: &mut VoxelMap) {
        self.terrain.fill_map(p, q, blocks);
        if let Err(e) = self.store.load_blocks(p, q, blocks) {
            log::warn!(target: "persist", "load blocks p={} q={}: {}", p, q, e);
        }
        if let Err(e) = self.store.load_lights(p, q, lights) {
            log::warn!(target: "persist", "load lights p={} q={}: {}", p, q, e);
        }
    }
}
