//! Procedural world content: fractal simplex noise and the chunk terrain generator.
#![forbid(unsafe_code)]

mod config;
mod noise;
mod terrain;

pub use config::{TerrainConfig, load_terrain_config};
pub use noise::SimplexNoise;
pub use terrain::TerrainGenerator;
