use tessel_blocks::{BLUE_FLOWER, BlockId, CLOUD, GRASS, LEAVES, SAND, TALL_GRASS, WOOD, YELLOW_FLOWER};
use tessel_map::{CHUNK_SIZE, VoxelMap};

use crate::config::TerrainConfig;
use crate::noise::SimplexNoise;

/// Columns generated around a chunk so neighbors see their border.
const PAD: i32 = 1;
const TREE_MARGIN: i32 = 4;
const CLOUD_Y: core::ops::Range<i32> = 64..72;

/// Heightmap terrain: sand flats, grassland with plants and trees, and a cloud layer.
#[derive(Debug)]
pub struct TerrainGenerator {
    cfg: TerrainConfig,
    noise: SimplexNoise,
}

impl TerrainGenerator {
    pub fn new(cfg: TerrainConfig) -> Self {
        let noise = SimplexNoise::new(cfg.seed);
        log::debug!(
            "terrain generator seed={} plants={} trees={} clouds={}",
            cfg.seed,
            cfg.plants,
            cfg.trees,
            cfg.clouds
        );
        Self { cfg, noise }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.cfg
    }

    /// Surface height and surface block for world column `(x,z)`.
    pub fn column(&self, x: i32, z: i32) -> (i32, BlockId) {
        let (xf, zf) = (x as f32, z as f32);
        let f = self.noise.simplex2(xf * 0.01, zf * 0.01, 4, 0.5, 2.0);
        let g = self.noise.simplex2(-xf * 0.01, -zf * 0.01, 2, 0.9, 2.0);
        let mh = (g * self.cfg.height_range + self.cfg.base_height) as i32;
        let h = (f * mh as f32) as i32;
        if h <= self.cfg.water_line {
            (self.cfg.water_line, SAND)
        } else {
            (h, GRASS)
        }
    }

    /// Emits every generated voxel of chunk `(p,q)` through `emit(x, y, z, w)`.
    ///
    /// The one-column pad around the chunk is emitted with negated values.
    pub fn generate(&self, p: i32, q: i32, mut emit: impl FnMut(i32, i32, i32, BlockId)) {
        let cfg = &self.cfg;
        for dx in -PAD..CHUNK_SIZE + PAD {
            for dz in -PAD..CHUNK_SIZE + PAD {
                let border = dx < 0 || dz < 0 || dx >= CHUNK_SIZE || dz >= CHUNK_SIZE;
                let flag: BlockId = if border { -1 } else { 1 };
                let x = p * CHUNK_SIZE + dx;
                let z = q * CHUNK_SIZE + dz;
                let (xf, zf) = (x as f32, z as f32);
                let (h, w) = self.column(x, z);
                for y in 0..h {
                    emit(x, y, z, w * flag);
                }
                if w == GRASS {
                    if cfg.plants {
                        if self.noise.simplex2(-xf * 0.1, zf * 0.1, 4, 0.8, 2.0) > cfg.grass_threshold {
                            emit(x, h, z, TALL_GRASS * flag);
                        }
                        if self.noise.simplex2(xf * 0.05, -zf * 0.05, 4, 0.8, 2.0)
                            > cfg.flower_threshold
                        {
                            let pick = self.noise.simplex2(xf * 0.1, zf * 0.1, 4, 0.8, 2.0) * 7.0;
                            let flower = YELLOW_FLOWER + (pick as BlockId).min(BLUE_FLOWER - YELLOW_FLOWER);
                            emit(x, h, z, flower * flag);
                        }
                    }
                    let room = dx - TREE_MARGIN >= 0
                        && dz - TREE_MARGIN >= 0
                        && dx + TREE_MARGIN < CHUNK_SIZE
                        && dz + TREE_MARGIN < CHUNK_SIZE;
                    if cfg.trees && room && self.noise.simplex2(xf, zf, 6, 0.5, 2.0) > cfg.tree_threshold {
                        self.tree(x, h, z, &mut emit);
                    }
                }
                if cfg.clouds {
                    for y in CLOUD_Y {
                        let c = self.noise.simplex3(xf * 0.01, y as f32 * 0.1, zf * 0.01, 8, 0.5, 2.0);
                        if c > cfg.cloud_threshold {
                            emit(x, y, z, CLOUD * flag);
                        }
                    }
                }
            }
        }
    }

    fn tree(&self, x: i32, h: i32, z: i32, emit: &mut impl FnMut(i32, i32, i32, BlockId)) {
        for y in h + 3..h + 8 {
            for ox in -3..=3 {
                for oz in -3..=3 {
                    let dy = y - (h + 4);
                    if ox * ox + oz * oz + dy * dy < 11 {
                        emit(x + ox, y, z + oz, LEAVES);
                    }
                }
            }
        }
        for y in h..h + 7 {
            emit(x, y, z, WOOD);
        }
    }

    /// Generates chunk `(p,q)` straight into a block map.
    pub fn fill_map(&self, p: i32, q: i32, map: &mut VoxelMap) {
        let mut written = 0usize;
        self.generate(p, q, |x, y, z, w| {
            written += usize::from(map.set(x, y, z, w));
        });
        log::trace!(target: "perf", "terrain p={} q={} voxels={}", p, q, written);
    }
}
