//! Main renderer managing wgpu state and the terrain pass.

use crate::{
    camera::{Camera, CameraUniform},
    mesh::DynamicMesh,
    pipeline::{
        create_frame_bind_group_layout, create_material_bind_group_layout,
        create_model_bind_group_layout, create_terrain_pipeline,
    },
    shading::{ShadingProgram, ShadingUniform},
    texture::Texture,
};
use anyhow::Result;
use bytemuck::Pod;
use engine_core::{Transform, TransformRaw};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// One tile on the GPU: its vertex/index buffers and model matrix.
pub struct TerrainDraw {
    pub mesh: DynamicMesh,
    model_bind_group: wgpu::BindGroup,
}

/// Main renderer.
pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_texture: Texture,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    shading_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_bind_group_layout: wgpu::BindGroupLayout,
    model_bind_group_layout: wgpu::BindGroupLayout,
    terrain_pipeline: wgpu::RenderPipeline,

    /// Background colour; matches the fog so distant terrain fades into it.
    clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shading = ShadingProgram::default();
        let shading_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shading Buffer"),
            contents: bytemuck::cast_slice(&[shading.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group_layout = create_frame_bind_group_layout(&device);
        let material_bind_group_layout = create_material_bind_group_layout(&device);
        let model_bind_group_layout = create_model_bind_group_layout(&device);

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: shading_buffer.as_entire_binding(),
                },
            ],
        });

        let terrain_pipeline = create_terrain_pipeline(
            &device,
            &config,
            &frame_bind_group_layout,
            &material_bind_group_layout,
            &model_bind_group_layout,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            camera_uniform,
            camera_buffer,
            shading_buffer,
            frame_bind_group,
            material_bind_group_layout,
            model_bind_group_layout,
            terrain_pipeline,
            clear_color: fog_clear_color(&shading),
        })
    }

    /// Handle window resize.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                "Depth Texture",
            );
        }
    }

    /// Reconfigure the surface at its current size (after `Lost` / `Outdated`).
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera_uniform.update(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    /// Upload the shading parameters and match the clear colour to the fog.
    pub fn update_shading(&mut self, shading: &ShadingProgram) {
        let uniform: ShadingUniform = shading.uniform();
        self.queue
            .write_buffer(&self.shading_buffer, 0, bytemuck::cast_slice(&[uniform]));
        self.clear_color = fog_clear_color(shading);
    }

    /// Create GPU buffers for one tile.
    pub fn create_terrain_draw<V: Pod>(
        &self,
        vertices: &[V],
        indices: &[u32],
        transform: &Transform,
        label: &str,
    ) -> TerrainDraw {
        let mesh = DynamicMesh::new(&self.device, vertices, indices, label);
        let model_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Model Buffer")),
            contents: bytemuck::cast_slice(&[TransformRaw::from(transform)]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let model_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Model Bind Group")),
            layout: &self.model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        TerrainDraw {
            mesh,
            model_bind_group,
        }
    }

    /// Replace a tile's vertex data (same vertex count as at creation).
    pub fn update_terrain_draw<V: Pod>(&self, draw: &TerrainDraw, vertices: &[V]) {
        draw.mesh.write(&self.queue, vertices);
    }

    /// Begin a new frame, returns the surface texture and command encoder.
    pub fn begin_frame(&mut self) -> Result<(wgpu::SurfaceTexture, wgpu::CommandEncoder)> {
        let output = self.surface.get_current_texture()?;
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        Ok((output, encoder))
    }

    /// Clear to the fog colour and draw the tiles. Without a material bind
    /// group (textures still loading) only the clear happens.
    pub fn render_terrain(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        material: Option<&wgpu::BindGroup>,
        draws: &[TerrainDraw],
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Terrain Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(material) = material else {
            return;
        };

        render_pass.set_pipeline(&self.terrain_pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        render_pass.set_bind_group(1, material, &[]);
        for draw in draws {
            render_pass.set_bind_group(2, &draw.model_bind_group, &[]);
            render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.mesh.num_indices, 0, 0..1);
        }
    }

    /// End frame and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Layout for [`crate::material::TerrainMaterial`] bind groups.
    pub fn material_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_bind_group_layout
    }
}

fn fog_clear_color(shading: &ShadingProgram) -> wgpu::Color {
    let c = shading.fog.linear_color();
    wgpu::Color {
        r: c.x as f64,
        g: c.y as f64,
        b: c.z as f64,
        a: 1.0,
    }
}
