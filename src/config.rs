use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use tessel_world::TerrainConfig;

/// Session settings. Radii are in chunks, Chebyshev distance.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TesselConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_create_radius")]
    pub create_radius: i32,
    #[serde(default = "default_render_radius")]
    pub render_radius: i32,
    #[serde(default = "default_delete_radius")]
    pub delete_radius: i32,
    /// Ring around the observer meshed synchronously each frame.
    #[serde(default = "default_force_radius")]
    pub force_radius: i32,
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
    #[serde(default = "default_commit_interval_secs")]
    pub commit_interval_secs: f32,
    #[serde(default = "default_true")]
    pub show_lights: bool,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default)]
    pub terrain: TerrainConfig,
}

fn default_workers() -> usize {
    4
}
fn default_create_radius() -> i32 {
    10
}
fn default_render_radius() -> i32 {
    10
}
fn default_delete_radius() -> i32 {
    14
}
fn default_force_radius() -> i32 {
    1
}
fn default_max_chunks() -> usize {
    8192
}
fn default_commit_interval_secs() -> f32 {
    5.0
}
fn default_true() -> bool {
    true
}
fn default_fov() -> f32 {
    65.0
}

impl Default for TesselConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            create_radius: default_create_radius(),
            render_radius: default_render_radius(),
            delete_radius: default_delete_radius(),
            force_radius: default_force_radius(),
            max_chunks: default_max_chunks(),
            commit_interval_secs: default_commit_interval_secs(),
            show_lights: true,
            fov: default_fov(),
            terrain: TerrainConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { field, reason } => write!(f, "invalid {}: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl TesselConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: TesselConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&s)?;
        log::info!("loaded config {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(invalid("workers", "need at least one worker"));
        }
        if self.create_radius < 0 || self.render_radius < 0 || self.force_radius < 0 {
            return Err(invalid("radius", "radii must be non-negative"));
        }
        if self.delete_radius <= self.create_radius {
            return Err(invalid(
                "delete_radius",
                format!(
                    "{} must exceed create_radius {}",
                    self.delete_radius, self.create_radius
                ),
            ));
        }
        let ring = (2 * self.force_radius + 1) as usize;
        if self.max_chunks < ring * ring {
            return Err(invalid(
                "max_chunks",
                format!("{} cannot hold the forced {ring}x{ring} ring", self.max_chunks),
            ));
        }
        if !self.commit_interval_secs.is_finite() || self.commit_interval_secs < 0.0 {
            return Err(invalid("commit_interval_secs", "must be a finite, non-negative number"));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(invalid("fov", format!("{} is outside (0, 180)", self.fov)));
        }
        Ok(())
    }
}
