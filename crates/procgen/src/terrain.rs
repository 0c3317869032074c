//! The terrain object graph: one height field, its coefficient source, and four tiles.
//!
//! **Static vs animated:** a static terrain is built once on its first update and
//! never touched again. An animated terrain recomputes its coefficients from the
//! elapsed time and rebuilds every tile on every frame, which is the dominant
//! per-frame cost (`(resolution + 1)²` height samples per tile).

use crate::error::TerrainError;
use crate::height::{Coefficients, HeightField, HeightFieldConfig};
use crate::schedule::CoefficientSchedule;
use crate::tile::{tile_offsets_2x2, TerrainTile};

/// Where the octave amplitudes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainMotion {
    /// Fixed coefficients; the surface is built exactly once.
    Static(Coefficients),
    /// Coefficients follow the schedule; the surface is rebuilt every frame.
    Animated(CoefficientSchedule),
}

impl Default for TerrainMotion {
    fn default() -> Self {
        Self::Animated(CoefficientSchedule::default())
    }
}

/// Configuration for terrain generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainConfig {
    /// Quads per tile side.
    pub resolution: u32,
    /// Size of one tile in world units.
    pub tile_width: f32,
    pub height_field: HeightFieldConfig,
    pub motion: TerrainMotion,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            resolution: 256,
            tile_width: 100.0,
            height_field: HeightFieldConfig::default(),
            motion: TerrainMotion::default(),
        }
    }
}

/// Four tiles arranged 2×2 around the origin over one shared height field.
#[derive(Debug)]
pub struct Terrain {
    field: HeightField,
    motion: TerrainMotion,
    coefficients: Coefficients,
    tiles: Vec<TerrainTile>,
    built: bool,
}

impl Terrain {
    pub fn new(config: TerrainConfig) -> Result<Self, TerrainError> {
        let field = HeightField::new(&config.height_field)?;
        let tiles = tile_offsets_2x2(config.tile_width)
            .into_iter()
            .map(|offset| TerrainTile::new(config.resolution, config.tile_width, offset))
            .collect::<Result<Vec<_>, _>>()?;
        let coefficients = match &config.motion {
            TerrainMotion::Static(c) => *c,
            TerrainMotion::Animated(schedule) => schedule.update(0.0),
        };

        let per_tile = tiles.first().map(|t| t.mesh().vertex_count()).unwrap_or(0);
        log::info!(
            "Terrain: {} tiles of {} vertices ({}), seed {}",
            tiles.len(),
            per_tile,
            if matches!(config.motion, TerrainMotion::Animated(_)) {
                "rebuilt every frame"
            } else {
                "built once"
            },
            config.height_field.seed,
        );

        Ok(Self {
            field,
            motion: config.motion,
            coefficients,
            tiles,
            built: false,
        })
    }

    /// Per-frame hook. Returns `true` when tile geometry changed.
    pub fn update(&mut self, elapsed_seconds: f64) -> bool {
        match &self.motion {
            TerrainMotion::Static(_) if self.built => return false,
            TerrainMotion::Static(_) => {}
            TerrainMotion::Animated(schedule) => {
                self.coefficients = schedule.update(elapsed_seconds);
            }
        }

        for tile in &mut self.tiles {
            tile.rebuild(&self.field, &self.coefficients);
        }
        self.built = true;
        log::trace!("terrain rebuilt at t={:.3}s with {:?}", elapsed_seconds, self.coefficients);
        true
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.motion, TerrainMotion::Animated(_))
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn tiles(&self) -> &[TerrainTile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [TerrainTile] {
        &mut self.tiles
    }

    /// Analytic surface height at world `(x, z)` for the current coefficients.
    pub fn elevation(&self, x: f32, z: f32) -> f32 {
        self.field.elevation(x as f64, z as f64, &self.coefficients) as f32
    }

    /// Vertices resampled by one full rebuild.
    pub fn vertex_count(&self) -> usize {
        self.tiles.iter().map(|t| t.mesh().vertex_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(motion: TerrainMotion) -> TerrainConfig {
        TerrainConfig {
            resolution: 8,
            tile_width: 100.0,
            motion,
            ..Default::default()
        }
    }

    #[test]
    fn builds_four_tiles_around_origin() {
        let terrain = Terrain::new(small(TerrainMotion::default())).unwrap();
        assert_eq!(terrain.tiles().len(), 4);
        assert_eq!(terrain.vertex_count(), 4 * 81);
        assert!(terrain.is_animated());
    }

    #[test]
    fn static_terrain_builds_once() {
        let mut terrain = Terrain::new(small(TerrainMotion::Static(Coefficients::default()))).unwrap();
        assert!(!terrain.is_animated());
        assert!(!terrain.built);
        assert!(terrain.update(0.0));
        let snapshot = terrain.tiles()[0].mesh().vertices().to_vec();
        assert!(!terrain.update(2.5));
        assert!(!terrain.update(100.0));
        assert_eq!(terrain.tiles()[0].mesh().vertices(), snapshot.as_slice());
        assert_eq!(terrain.coefficients(), Coefficients::default());
    }

    #[test]
    fn animated_terrain_follows_schedule() {
        let schedule = CoefficientSchedule::default();
        let mut terrain = Terrain::new(small(TerrainMotion::Animated(schedule.clone()))).unwrap();
        assert_eq!(terrain.coefficients(), schedule.max());
        assert!(terrain.update(1.5));
        assert_eq!(terrain.coefficients(), schedule.update(1.5));
        assert!(terrain.update(1.5 + 0.25));
        assert_eq!(terrain.coefficients(), schedule.update(1.75));
    }

    #[test]
    fn animated_terrain_changes_shape_over_time() {
        let mut terrain = Terrain::new(small(TerrainMotion::default())).unwrap();
        terrain.update(0.0);
        let early = terrain.tiles()[3].mesh().vertices().to_vec();
        terrain.update(4.0);
        assert_ne!(terrain.tiles()[3].mesh().vertices(), early.as_slice());
        terrain.update(6.0);
        assert_eq!(terrain.tiles()[3].mesh().vertices(), early.as_slice());
    }

    #[test]
    fn mesh_heights_match_analytic_elevation() {
        let mut terrain = Terrain::new(small(TerrainMotion::default())).unwrap();
        terrain.update(2.0);
        let tile = &terrain.tiles()[1];
        let v = tile.mesh().vertex(3, 5);
        let wx = v.position[0] + tile.offset().x;
        let wz = v.position[2] + tile.offset().y;
        assert_eq!(v.position[1], terrain.elevation(wx, wz));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = TerrainConfig {
            resolution: 0,
            ..small(TerrainMotion::default())
        };
        assert_eq!(Terrain::new(config).unwrap_err(), TerrainError::InvalidResolution(0));

        let config = TerrainConfig {
            tile_width: 0.0,
            ..small(TerrainMotion::default())
        };
        assert!(Terrain::new(config).is_err());

        let config = TerrainConfig {
            resolution: 70_000,
            ..small(TerrainMotion::default())
        };
        assert_eq!(
            Terrain::new(config).unwrap_err(),
            TerrainError::InvalidResolution(70_000)
        );
    }
}
