//! Viewer state: the terrain, its GPU mirrors and the per-frame update / render.

use anyhow::Result;
use engine_core::Time;
use glam::Vec3;
use image::RgbaImage;
use procgen::{GroundKind, GroundTextureConfig, Terrain, TextureGenerator};
use renderer::{Camera, GroundSlot, Renderer, TerrainDraw, TerrainMaterial};
use std::sync::Arc;
use winit::window::Window;

use crate::config::ViewerConfig;

/// Side of the generated stand-in texture when an image fails to load.
const FALLBACK_TEXTURE_SIZE: u32 = 256;
/// Seconds between frame-rate log lines.
const STATS_INTERVAL: f64 = 5.0;

pub struct ViewerState {
    pub renderer: Renderer,
    pub camera: Camera,
    pub time: Time,
    pub terrain: Terrain,
    draws: Vec<TerrainDraw>,
    material: TerrainMaterial,
    texture_seed: u64,
    last_stats: f64,
    pub running: bool,
}

impl ViewerState {
    pub async fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let mut renderer = Renderer::new(window.clone(), config.vsync).await?;

        let mut terrain = Terrain::new(config.terrain_config()?)?;
        // First build so the buffers start with real geometry.
        terrain.update(0.0);

        let draws = terrain
            .tiles_mut()
            .iter_mut()
            .enumerate()
            .map(|(i, tile)| {
                tile.mesh_mut().take_dirty();
                renderer.create_terrain_draw(
                    tile.mesh().vertices(),
                    tile.mesh().indices(),
                    &tile.transform(),
                    &format!("Terrain Tile {i}"),
                )
            })
            .collect();

        let material = TerrainMaterial::load(&config.primary_texture, &config.secondary_texture);

        let shading = config.shading_program();
        renderer.update_shading(&shading);

        let size = window.inner_size();
        let mut camera = Camera::new(Vec3::from_array(config.camera_position));
        camera.fov_degrees = config.camera_fov;
        camera.far = config.camera_far;
        camera.set_aspect(size.width, size.height);
        camera.look_at(Vec3::from_array(config.camera_target));

        Ok(Self {
            renderer,
            camera,
            time: Time::new(),
            terrain,
            draws,
            material,
            texture_seed: config.seed as u64,
            last_stats: 0.0,
            running: true,
        })
    }

    /// Per-frame hook: advance the clock, reshape the terrain, push changed
    /// tiles to the GPU and resolve pending textures.
    pub fn update(&mut self) {
        self.time.update();
        let elapsed = self.time.elapsed_seconds_f64();

        self.terrain.update(elapsed);
        for (tile, draw) in self.terrain.tiles_mut().iter_mut().zip(&self.draws) {
            if tile.mesh_mut().take_dirty() {
                self.renderer.update_terrain_draw(draw, tile.mesh().vertices());
            }
        }

        if !self.material.is_ready() {
            let seed = self.texture_seed;
            let mut fallback = |slot: GroundSlot| generated_ground(seed, slot);
            if self.material.poll(
                self.renderer.device(),
                self.renderer.queue(),
                self.renderer.material_bind_group_layout(),
                &mut fallback,
            ) {
                log::info!("Ground textures ready after {:.2}s", elapsed);
            }
        }

        if elapsed - self.last_stats >= STATS_INTERVAL {
            self.last_stats = elapsed;
            if self.terrain.is_animated() {
                log::debug!(
                    "{:.0} fps, {} vertices per rebuild, coefficients {:?}",
                    self.time.fps(),
                    self.terrain.vertex_count(),
                    self.terrain.coefficients()
                );
            } else {
                log::debug!("{:.0} fps, static terrain", self.time.fps());
            }
        }
    }

    pub fn render(&mut self) -> Result<()> {
        self.renderer.update_camera(&self.camera);

        let (output, mut encoder) = match self.renderer.begin_frame() {
            Ok(frame) => frame,
            Err(e) => {
                if let Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) =
                    e.downcast_ref::<wgpu::SurfaceError>()
                {
                    self.renderer.reconfigure();
                    return Ok(());
                }
                return Err(e);
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .render_terrain(&mut encoder, &view, self.material.bind_group(), &self.draws);

        self.renderer.end_frame(output, encoder);
        Ok(())
    }
}

/// Procedural stand-in for a ground image that could not be loaded.
fn generated_ground(seed: u64, slot: GroundSlot) -> RgbaImage {
    let kind = match slot {
        GroundSlot::Primary => GroundKind::Grass,
        GroundSlot::Secondary => GroundKind::Rock,
    };
    let data = TextureGenerator::new(seed).generate_ground(
        kind,
        FALLBACK_TEXTURE_SIZE,
        FALLBACK_TEXTURE_SIZE,
        &GroundTextureConfig::default(),
    );
    RgbaImage::from_raw(data.width, data.height, data.to_bytes())
        .unwrap_or_else(|| RgbaImage::from_pixel(1, 1, image::Rgba([128, 128, 128, 255])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_texture_matches_slot() {
        let grass = generated_ground(80, GroundSlot::Primary);
        let rock = generated_ground(80, GroundSlot::Secondary);
        assert_eq!(grass.dimensions(), (FALLBACK_TEXTURE_SIZE, FALLBACK_TEXTURE_SIZE));
        assert_ne!(grass.as_raw(), rock.as_raw());
    }

    #[test]
    fn patch_vertices_upload_as_renderer_vertices() {
        assert_eq!(
            std::mem::size_of::<procgen::TerrainVertex>(),
            std::mem::size_of::<renderer::Vertex>()
        );
    }
}
