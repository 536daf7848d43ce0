use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Terrain generator knobs. Every field has a default so partial TOML works.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TerrainConfig {
    #[serde(default)]
    pub seed: i32,
    #[serde(default = "default_true")]
    pub plants: bool,
    #[serde(default = "default_true")]
    pub trees: bool,
    #[serde(default = "default_true")]
    pub clouds: bool,
    /// Columns at or below this height become sand flats.
    #[serde(default = "default_water_line")]
    pub water_line: i32,
    #[serde(default = "default_base_height")]
    pub base_height: f32,
    #[serde(default = "default_height_range")]
    pub height_range: f32,
    #[serde(default = "default_grass_threshold")]
    pub grass_threshold: f32,
    #[serde(default = "default_flower_threshold")]
    pub flower_threshold: f32,
    #[serde(default = "default_tree_threshold")]
    pub tree_threshold: f32,
    #[serde(default = "default_cloud_threshold")]
    pub cloud_threshold: f32,
}

fn default_true() -> bool {
    true
}
fn default_water_line() -> i32 {
    12
}
fn default_base_height() -> f32 {
    16.0
}
fn default_height_range() -> f32 {
    32.0
}
fn default_grass_threshold() -> f32 {
    0.6
}
fn default_flower_threshold() -> f32 {
    0.7
}
fn default_tree_threshold() -> f32 {
    0.84
}
fn default_cloud_threshold() -> f32 {
    0.75
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            plants: true,
            trees: true,
            clouds: true,
            water_line: default_water_line(),
            base_height: default_base_height(),
            height_range: default_height_range(),
            grass_threshold: default_grass_threshold(),
            flower_threshold: default_flower_threshold(),
            tree_threshold: default_tree_threshold(),
            cloud_threshold: default_cloud_threshold(),
        }
    }
}

pub fn load_terrain_config(path: &Path) -> Result<TerrainConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: TerrainConfig = toml::from_str(&s)?;
    log::info!("loaded terrain config {} seed={}", path.display(), cfg.seed);
    Ok(cfg)
}
