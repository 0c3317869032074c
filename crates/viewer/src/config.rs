//! Viewer configuration (window, terrain, shading, camera). Loaded from
//! `terrain.ron` at startup.

use glam::Vec3;
use procgen::{
    CoefficientSchedule, Coefficients, HeightFieldConfig, TerrainConfig, TerrainError,
    TerrainMotion,
};
use renderer::{BlendLaw, Fog, Lighting, ShadingProgram};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "terrain.ron";

/// Whether the surface undulates or is built once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TerrainVariant {
    #[default]
    Animated,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Mix,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightingMode {
    #[default]
    Directional,
    Unlit,
}

/// Persistent viewer settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,

    #[serde(default)]
    pub variant: TerrainVariant,
    #[serde(default = "default_seed")]
    pub seed: u32,
    /// Quads per tile side.
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    #[serde(default = "default_tile_width")]
    pub tile_width: f32,
    /// Seconds per animation cycle.
    #[serde(default = "default_period")]
    pub period: f64,
    /// Octave amplitudes at the start of each cycle.
    #[serde(default = "default_coefficients_max")]
    pub coefficients_max: [f64; 3],
    /// Octave amplitudes just before the cycle wraps.
    #[serde(default = "default_coefficients_min")]
    pub coefficients_min: [f64; 3],
    /// Octave amplitudes for the static variant.
    #[serde(default = "default_coefficients_max")]
    pub coefficients_static: [f64; 3],

    #[serde(default = "default_primary_texture")]
    pub primary_texture: PathBuf,
    #[serde(default = "default_secondary_texture")]
    pub secondary_texture: PathBuf,
    #[serde(default)]
    pub blend: BlendMode,
    #[serde(default)]
    pub lighting: LightingMode,
    #[serde(default = "default_light_direction")]
    pub light_direction: [f32; 3],
    /// sRGB fog colour, 0-1 per channel.
    #[serde(default = "default_fog_color")]
    pub fog_color: [f32; 3],
    #[serde(default = "default_fog_near")]
    pub fog_near: f32,
    #[serde(default = "default_fog_far")]
    pub fog_far: f32,

    #[serde(default = "default_camera_position")]
    pub camera_position: [f32; 3],
    #[serde(default)]
    pub camera_target: [f32; 3],
    #[serde(default = "default_camera_fov")]
    pub camera_fov: f32,
    #[serde(default = "default_camera_far")]
    pub camera_far: f32,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_seed() -> u32 {
    procgen::DEFAULT_NOISE_SEED
}
fn default_resolution() -> u32 {
    256
}
fn default_tile_width() -> f32 {
    100.0
}
fn default_period() -> f64 {
    procgen::DEFAULT_PERIOD
}
fn default_coefficients_max() -> [f64; 3] {
    Coefficients::default().to_array()
}
fn default_coefficients_min() -> [f64; 3] {
    [0.1; 3]
}
fn default_primary_texture() -> PathBuf {
    PathBuf::from("assets/grass.jpg")
}
fn default_secondary_texture() -> PathBuf {
    PathBuf::from("assets/rock.jpg")
}
fn default_light_direction() -> [f32; 3] {
    [0.5, 1.0, 0.5]
}
fn default_fog_color() -> [f32; 3] {
    Fog::default().color.to_array()
}
fn default_fog_near() -> f32 {
    Fog::default().near
}
fn default_fog_far() -> f32 {
    Fog::default().far
}
fn default_camera_position() -> [f32; 3] {
    [0.0, 8.0, 12.0]
}
fn default_camera_fov() -> f32 {
    75.0
}
fn default_camera_far() -> f32 {
    500.0
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            variant: TerrainVariant::default(),
            seed: default_seed(),
            resolution: default_resolution(),
            tile_width: default_tile_width(),
            period: default_period(),
            coefficients_max: default_coefficients_max(),
            coefficients_min: default_coefficients_min(),
            coefficients_static: default_coefficients_max(),
            primary_texture: default_primary_texture(),
            secondary_texture: default_secondary_texture(),
            blend: BlendMode::default(),
            lighting: LightingMode::default(),
            light_direction: default_light_direction(),
            fog_color: default_fog_color(),
            fog_near: default_fog_near(),
            fog_far: default_fog_far(),
            camera_position: default_camera_position(),
            camera_target: [0.0; 3],
            camera_fov: default_camera_fov(),
            camera_far: default_camera_far(),
        }
    }
}

impl ViewerConfig {
    /// Load config from `terrain.ron`. If the file is missing or invalid, returns default config.
    /// A default file is written when none exists so the settings are easy to edit.
    pub fn load() -> Self {
        let path = config_path();
        let config = Self::load_from(&path);
        if !path.exists() {
            config.save();
        }
        config
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match Self::from_ron_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::warn!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    pub fn from_ron_str(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save current config to `terrain.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialise config: {}", e),
        }
    }

    /// Terrain construction parameters. Bounds are validated here so a bad
    /// file is reported before any tile is allocated.
    pub fn terrain_config(&self) -> Result<TerrainConfig, TerrainError> {
        let motion = match self.variant {
            TerrainVariant::Animated => TerrainMotion::Animated(CoefficientSchedule::new(
                self.period,
                Coefficients::from_array(self.coefficients_max),
                Coefficients::from_array(self.coefficients_min),
            )?),
            TerrainVariant::Static => {
                TerrainMotion::Static(Coefficients::from_array(self.coefficients_static))
            }
        };

        Ok(TerrainConfig {
            resolution: self.resolution,
            tile_width: self.tile_width,
            height_field: HeightFieldConfig {
                seed: self.seed,
                ..Default::default()
            },
            motion,
        })
    }

    pub fn shading_program(&self) -> ShadingProgram {
        ShadingProgram {
            blend: match self.blend {
                BlendMode::Mix => BlendLaw::Mix,
                BlendMode::Linear => BlendLaw::Linear,
            },
            lighting: match self.lighting {
                LightingMode::Directional => Lighting::Directional,
                LightingMode::Unlit => Lighting::Unlit,
            },
            fog: Fog {
                color: Vec3::from_array(self.fog_color),
                near: self.fog_near,
                far: self.fog_far,
            },
            ..Default::default()
        }
        .with_light_direction(Vec3::from_array(self.light_direction))
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}
