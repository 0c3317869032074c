//! Terrain material: the two ground textures the shading program blends.
//!
//! Each texture starts as a background decode. The material only exposes a bind
//! group once both slots hold an uploaded texture; until then the terrain is
//! not drawn.

use image::RgbaImage;

use crate::{
    asset::{ImageHandle, LoadState},
    texture::Texture,
};

/// Which of the two ground textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundSlot {
    /// `t_one`: flat-ground texture under the linear blend, slope texture under mix.
    Primary,
    /// `t_sec`
    Secondary,
}

impl GroundSlot {
    pub const ALL: [GroundSlot; 2] = [GroundSlot::Primary, GroundSlot::Secondary];

    pub fn label(self) -> &'static str {
        match self {
            GroundSlot::Primary => "Ground Texture One",
            GroundSlot::Secondary => "Ground Texture Two",
        }
    }

    fn index(self) -> usize {
        match self {
            GroundSlot::Primary => 0,
            GroundSlot::Secondary => 1,
        }
    }
}

enum SlotState {
    Loading(ImageHandle),
    Ready(Texture),
}

/// Two ground textures and, once both are resident, their bind group.
pub struct TerrainMaterial {
    slots: [SlotState; 2],
    bind_group: Option<wgpu::BindGroup>,
}

impl TerrainMaterial {
    /// Start decoding both images.
    pub fn load(primary: impl AsRef<std::path::Path>, secondary: impl AsRef<std::path::Path>) -> Self {
        Self {
            slots: [
                SlotState::Loading(ImageHandle::spawn(primary)),
                SlotState::Loading(ImageHandle::spawn(secondary)),
            ],
            bind_group: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.bind_group.is_some()
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Advance pending loads. A slot whose image fails is filled from
    /// `fallback`. Returns `true` on the call that makes the material ready.
    pub fn poll(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        fallback: &mut dyn FnMut(GroundSlot) -> RgbaImage,
    ) -> bool {
        if self.bind_group.is_some() {
            return false;
        }

        for slot in GroundSlot::ALL {
            let state = &mut self.slots[slot.index()];
            let SlotState::Loading(handle) = state else {
                continue;
            };
            let image = match handle.poll() {
                LoadState::Pending => continue,
                LoadState::Ready(image) => {
                    log::info!(
                        "Loaded {} ({}x{})",
                        handle.path().display(),
                        image.width(),
                        image.height()
                    );
                    image
                }
                LoadState::Failed(e) => {
                    log::warn!("{:#}; using generated {}", e, slot.label());
                    fallback(slot)
                }
            };
            *state = SlotState::Ready(Texture::from_rgba(device, queue, &image, slot.label()));
        }

        let (SlotState::Ready(one), SlotState::Ready(two)) = (&self.slots[0], &self.slots[1]) else {
            return false;
        };

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Terrain Material Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&one.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&two.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&one.sampler),
                },
            ],
        }));
        true
    }
}
