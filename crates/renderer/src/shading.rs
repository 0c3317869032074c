//! Terrain shading program: two ground textures blended by steepness, a fixed
//! directional light and distance fog.
//!
//! The WGSL in `shaders/terrain.wgsl` is the program the GPU runs; the functions
//! here compute the same per-pixel values on the CPU and are kept in lockstep
//! with it.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Vertex/fragment source for the terrain pass.
pub const TERRAIN_SHADER: &str = include_str!("shaders/terrain.wgsl");
pub const TERRAIN_VERTEX_ENTRY: &str = "vs_main";
pub const TERRAIN_FRAGMENT_ENTRY: &str = "fs_main";

/// Texture repeats per tile.
pub const DEFAULT_UV_REPEAT: f32 = 4.0;

/// How the two ground samples are combined by the steepness amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendLaw {
    /// `mix(a, b, amount)`: `b` on flat ground, `a` on slopes.
    #[default]
    Mix,
    /// `a * amount + b * (1 - amount)`: `a` on flat ground, `b` on slopes.
    Linear,
}

impl BlendLaw {
    pub fn blend(self, a: Vec3, b: Vec3, amount: f32) -> Vec3 {
        match self {
            BlendLaw::Mix => a.lerp(b, amount),
            BlendLaw::Linear => a * amount + b * (1.0 - amount),
        }
    }

    fn as_uniform(self) -> f32 {
        match self {
            BlendLaw::Mix => 0.0,
            BlendLaw::Linear => 1.0,
        }
    }
}

/// Whether the blended colour is modulated by the directional light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lighting {
    #[default]
    Directional,
    /// Illumination fixed at 1.
    Unlit,
}

/// Linear-distance fog blended over the lit colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            // Scene fog colour (#ffffff); it replaces the material's own fog colour.
            color: Vec3::ONE,
            near: 1.0,
            far: 20.0,
        }
    }
}

impl Fog {
    /// Fog weight at view depth `depth`: smoothstep from `near` to `far`.
    pub fn factor(&self, depth: f32) -> f32 {
        if self.far <= self.near {
            return if depth < self.near { 0.0 } else { 1.0 };
        }
        let t = ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }

    pub fn apply(&self, color: Vec3, depth: f32) -> Vec3 {
        color.lerp(self.color, self.factor(depth))
    }

    /// Fog colour in linear space, as the GPU blends it before sRGB encoding.
    pub fn linear_color(&self) -> Vec3 {
        Vec3::new(
            srgb_to_linear(self.color.x),
            srgb_to_linear(self.color.y),
            srgb_to_linear(self.color.z),
        )
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `fract(uv * repeat)`, always in [0, 1).
pub fn tiled_uv(uv: Vec2, repeat: f32) -> Vec2 {
    let scaled = uv * repeat;
    scaled - scaled.floor()
}

/// Near 1 on flat ground, falling quickly to 0 as the surface steepens.
pub fn steepness_amount(normal_y: f32) -> f32 {
    let s = ((1.0 - normal_y.abs()) * 3.0).max(0.0);
    1.0 - s.powi(4).min(1.0)
}

/// Lambert term against `light_dir` (unit length). A zero-length normal is unlit.
pub fn illumination(normal: Vec3, light_dir: Vec3) -> f32 {
    match normal.try_normalize() {
        Some(n) => n.dot(light_dir).max(0.0),
        None => 0.0,
    }
}

/// Terrain shading uniform (must match terrain.wgsl ShadingUniform).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadingUniform {
    /// xyz = unit light direction, w unused
    pub light_direction: [f32; 4],
    /// rgb = linear fog colour, a unused
    pub fog_color: [f32; 4],
    /// x = fog near, y = fog far, z = uv repeat, w unused
    pub fog_params: [f32; 4],
    /// x = blend law (0 mix, 1 linear), y = lighting (1 directional, 0 unlit), zw unused
    pub params: [f32; 4],
}

/// The terrain shading configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingProgram {
    pub blend: BlendLaw,
    pub lighting: Lighting,
    /// Unit direction towards the light.
    pub light_direction: Vec3,
    pub uv_repeat: f32,
    pub fog: Fog,
}

impl Default for ShadingProgram {
    fn default() -> Self {
        Self {
            blend: BlendLaw::default(),
            lighting: Lighting::default(),
            light_direction: Vec3::new(0.5, 1.0, 0.5).normalize(),
            uv_repeat: DEFAULT_UV_REPEAT,
            fog: Fog::default(),
        }
    }
}

impl ShadingProgram {
    /// Set the light direction; zero-length input keeps light straight overhead.
    pub fn with_light_direction(mut self, direction: Vec3) -> Self {
        self.light_direction = direction.try_normalize().unwrap_or(Vec3::Y);
        self
    }

    /// Colour for one pixel given the two texture samples (already taken at
    /// [`tiled_uv`]), the interpolated normal and the view depth.
    pub fn shade(&self, texture_a: Vec3, texture_b: Vec3, normal: Vec3, view_depth: f32) -> Vec3 {
        let amount = steepness_amount(normal.y);
        let color = self.blend.blend(texture_a, texture_b, amount);
        let illum = match self.lighting {
            Lighting::Directional => illumination(normal, self.light_direction),
            Lighting::Unlit => 1.0,
        };
        self.fog.apply(color * illum, view_depth)
    }

    pub fn uniform(&self) -> ShadingUniform {
        ShadingUniform {
            light_direction: self.light_direction.extend(0.0).to_array(),
            fog_color: self.fog.linear_color().extend(1.0).to_array(),
            // The shader uses a plain smoothstep; keep its edges ordered.
            fog_params: [
                self.fog.near,
                self.fog.far.max(self.fog.near + f32::EPSILON),
                self.uv_repeat,
                0.0,
            ],
            params: [
                self.blend.as_uniform(),
                match self.lighting {
                    Lighting::Directional => 1.0,
                    Lighting::Unlit => 0.0,
                },
                0.0,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS: Vec3 = Vec3::new(0.2, 0.6, 0.1);
    const ROCK: Vec3 = Vec3::new(0.5, 0.5, 0.5);

    fn no_fog() -> Fog {
        Fog {
            near: 1.0e6,
            far: 2.0e6,
            ..Default::default()
        }
    }

    #[test]
    fn uv_repeats_four_times_per_tile() {
        assert_eq!(tiled_uv(Vec2::new(0.0, 0.0), 4.0), Vec2::ZERO);
        assert_eq!(tiled_uv(Vec2::new(0.25, 0.5), 4.0), Vec2::ZERO);
        let uv = tiled_uv(Vec2::new(0.3, 0.9), 4.0);
        assert!((uv - Vec2::new(0.2, 0.6)).length() < 1e-5);
        let uv = tiled_uv(Vec2::new(-0.1, 1.0), 4.0);
        assert!(uv.x >= 0.0 && uv.x < 1.0 && uv.y >= 0.0 && uv.y < 1.0);
    }

    #[test]
    fn steepness_is_one_on_flat_and_zero_on_cliffs() {
        assert_eq!(steepness_amount(1.0), 1.0);
        assert_eq!(steepness_amount(-1.0), 1.0);
        assert_eq!(steepness_amount(0.0), 0.0);
        // (3 * 0.1)^4 = 0.0081
        assert!((steepness_amount(0.9) - (1.0 - 0.0081)).abs() < 1e-5);
        // Beyond 1 - 1/3 the slope term saturates.
        assert_eq!(steepness_amount(0.6), 0.0);
    }

    #[test]
    fn steepness_never_increases_with_slope() {
        let mut prev = steepness_amount(1.0);
        for i in 1..=100 {
            let a = steepness_amount(1.0 - i as f32 / 100.0);
            assert!(a <= prev);
            prev = a;
        }
    }

    #[test]
    fn blend_laws() {
        assert_eq!(BlendLaw::Mix.blend(GRASS, ROCK, 1.0), ROCK);
        assert_eq!(BlendLaw::Mix.blend(GRASS, ROCK, 0.0), GRASS);
        assert_eq!(BlendLaw::Linear.blend(GRASS, ROCK, 1.0), GRASS);
        assert_eq!(BlendLaw::Linear.blend(GRASS, ROCK, 0.0), ROCK);
        let half = BlendLaw::Linear.blend(GRASS, ROCK, 0.5);
        assert!((half - (GRASS + ROCK) * 0.5).length() < 1e-6);
    }

    #[test]
    fn illumination_handles_degenerate_normal() {
        let l = ShadingProgram::default().light_direction;
        assert_eq!(illumination(Vec3::ZERO, l), 0.0);
        assert!((illumination(Vec3::Y * 5.0, l) - l.y).abs() < 1e-6);
        assert_eq!(illumination(-Vec3::Y, l), 0.0);
    }

    #[test]
    fn default_light_is_normalised() {
        let l = ShadingProgram::default().light_direction;
        assert!((l.length() - 1.0).abs() < 1e-6);
        assert!((l - Vec3::new(0.5, 1.0, 0.5) / 1.5_f32.sqrt()).length() < 1e-6);
    }

    #[test]
    fn flat_ground_lit_shading() {
        let program = ShadingProgram {
            fog: no_fog(),
            ..Default::default()
        };
        let color = program.shade(GRASS, ROCK, Vec3::Y, 5.0);
        let expected = ROCK * program.light_direction.y;
        assert!((color - expected).length() < 1e-6);
    }

    #[test]
    fn unlit_linear_variant() {
        let program = ShadingProgram {
            blend: BlendLaw::Linear,
            lighting: Lighting::Unlit,
            fog: no_fog(),
            ..Default::default()
        };
        assert_eq!(program.shade(GRASS, ROCK, Vec3::Y, 5.0), GRASS);
        assert_eq!(program.shade(GRASS, ROCK, Vec3::X, 5.0), ROCK);
    }

    #[test]
    fn fog_ramps_between_near_and_far() {
        let fog = Fog::default();
        assert_eq!(fog.factor(0.5), 0.0);
        assert_eq!(fog.factor(25.0), 1.0);
        assert!((fog.factor(10.5) - 0.5).abs() < 1e-6);
        assert_eq!(fog.apply(GRASS, 100.0), fog.color);
        let collapsed = Fog { near: 5.0, far: 5.0, ..fog };
        assert_eq!(collapsed.factor(4.0), 0.0);
        assert_eq!(collapsed.factor(6.0), 1.0);
    }

    #[test]
    fn default_fog_is_white_from_one_to_twenty() {
        let fog = Fog::default();
        assert_eq!(fog.color, Vec3::ONE);
        assert!((fog.linear_color() - Vec3::ONE).abs().max_element() < 1e-6);
        assert_eq!((fog.near, fog.far), (1.0, 20.0));
        // sRGB 0x88 is roughly 0.246 linear.
        assert!((srgb_to_linear(136.0 / 255.0) - 0.2462).abs() < 1e-3);
    }

    #[test]
    fn uniform_encodes_modes() {
        let program = ShadingProgram {
            blend: BlendLaw::Linear,
            lighting: Lighting::Unlit,
            ..Default::default()
        };
        let u = program.uniform();
        assert_eq!(u.params[0], 1.0);
        assert_eq!(u.params[1], 0.0);
        assert_eq!(u.fog_params[2], 4.0);
        assert!(u.fog_color[..3].iter().all(|c| (c - 1.0).abs() < 1e-6));
        assert_eq!(std::mem::size_of::<ShadingUniform>() % 16, 0);
        assert!(ShadingProgram::default().with_light_direction(Vec3::ZERO).light_direction == Vec3::Y);
    }

    #[test]
    fn shader_declares_entry_points() {
        assert!(TERRAIN_SHADER.contains(&format!("fn {}", TERRAIN_VERTEX_ENTRY)));
        assert!(TERRAIN_SHADER.contains(&format!("fn {}", TERRAIN_FRAGMENT_ENTRY)));
    }
}
