//! wgpu renderer for the terrain viewer: surface and pipeline setup, per-tile
//! GPU meshes, background texture loading and the terrain shading program.

pub mod asset;
pub mod camera;
pub mod material;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod shading;
pub mod texture;
pub mod vertex;

pub use asset::*;
pub use camera::*;
pub use material::*;
pub use mesh::*;
pub use pipeline::*;
pub use renderer::*;
pub use shading::*;
pub use texture::*;
pub use vertex::*;
