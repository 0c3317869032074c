//! Procedural ground textures. Used in place of the grass / rock images when
//! they cannot be loaded, so the terrain still has two distinct surfaces to blend.

use glam::{Vec2, Vec3};
use noise::{NoiseFn, Perlin};
use rand::prelude::*;

/// RGBA pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: (r.clamp(0.0, 1.0) * 255.0) as u8,
            g: (g.clamp(0.0, 1.0) * 255.0) as u8,
            b: (b.clamp(0.0, 1.0) * 255.0) as u8,
            a: 255,
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Generated texture data
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Pixel>,
}

impl TextureData {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::new(0, 0, 0, 255); (width * height) as usize],
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = pixel;
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Pixel {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize]
        } else {
            Pixel::new(0, 0, 0, 255)
        }
    }

    /// Tightly packed RGBA8 rows, ready for a texture upload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&pixel.to_bytes());
        }
        bytes
    }

    /// Mean colour, 0–1 per channel.
    pub fn average_rgb(&self) -> Vec3 {
        if self.pixels.is_empty() {
            return Vec3::ZERO;
        }
        let sum = self.pixels.iter().fold(Vec3::ZERO, |acc, p| {
            acc + Vec3::new(p.r as f32, p.g as f32, p.b as f32)
        });
        sum / (self.pixels.len() as f32 * 255.0)
    }
}

/// The two surfaces the terrain shader blends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundKind {
    Grass,
    Rock,
}

/// Colours for the generated ground textures.
#[derive(Debug, Clone)]
pub struct GroundTextureConfig {
    pub grass_color: Vec3,
    pub grass_tip_color: Vec3,
    pub rock_color: Vec3,
    pub rock_vein_color: Vec3,
}

impl Default for GroundTextureConfig {
    fn default() -> Self {
        Self {
            grass_color: Vec3::new(0.22, 0.42, 0.14),
            grass_tip_color: Vec3::new(0.45, 0.58, 0.22),
            rock_color: Vec3::new(0.45, 0.42, 0.39),
            rock_vein_color: Vec3::new(0.30, 0.28, 0.26),
        }
    }
}

/// Procedural ground texture generator. The output tiles seamlessly enough for
/// the shader's four repeats per tile.
pub struct TextureGenerator {
    perlin: Perlin,
}

impl TextureGenerator {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            perlin: Perlin::new(rng.gen()),
        }
    }

    pub fn generate_ground(
        &self,
        kind: GroundKind,
        width: u32,
        height: u32,
        config: &GroundTextureConfig,
    ) -> TextureData {
        match kind {
            GroundKind::Grass => self.generate_grass(width, height, config),
            GroundKind::Rock => self.generate_rock(width, height, config),
        }
    }

    fn generate_grass(&self, width: u32, height: u32, config: &GroundTextureConfig) -> TextureData {
        let mut texture = TextureData::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let u = x as f64 / width as f64;
                let v = y as f64 / height as f64;

                // Patches of lighter and darker turf
                let patches = self.fbm(u * 6.0, v * 6.0, 3);
                // Vertical streaks read as blades at grazing angles
                let blades = self.fbm(u * 96.0, v * 12.0, 2);

                let mut color = config
                    .grass_color
                    .lerp(config.grass_tip_color, self.smooth_step(0.35, 0.75, patches) as f32);
                color *= (0.8 + blades * 0.4) as f32;

                texture.set_pixel(x, y, Pixel::from_rgb(color.x, color.y, color.z));
            }
        }

        texture
    }

    fn generate_rock(&self, width: u32, height: u32, config: &GroundTextureConfig) -> TextureData {
        let mut texture = TextureData::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let u = x as f64 / width as f64;
                let v = y as f64 / height as f64;

                let large_scale = self.fbm(u * 4.0, v * 4.0, 3);
                let medium_scale = self.fbm(u * 16.0, v * 16.0, 4);

                let mut color = config
                    .rock_color
                    .lerp(config.rock_vein_color, self.smooth_step(0.45, 0.65, large_scale) as f32);
                color *= (0.8 + medium_scale * 0.4) as f32;

                // Cracks between stones
                let crack = self.crack_pattern(u * 12.0, v * 12.0);
                color *= 1.0 - (1.0 - crack as f32) * 0.35;

                texture.set_pixel(x, y, Pixel::from_rgb(color.x, color.y, color.z));
            }
        }

        texture
    }

    // Noise helper functions

    fn fbm(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 1.0;

        for _ in 0..octaves {
            value += amplitude * (self.perlin.get([x * frequency, y * frequency]) * 0.5 + 0.5);
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        value
    }

    fn voronoi(&self, x: f64, y: f64) -> (f64, f64) {
        let n = (x.floor(), y.floor());
        let f = (x.fract(), y.fract());

        let mut min_dist = 8.0;
        let mut second_dist = 8.0;

        for j in -1..=1 {
            for i in -1..=1 {
                let g = (i as f64, j as f64);
                let o = (
                    self.hash2d(n.0 + g.0, n.1 + g.1),
                    self.hash2d(n.0 + g.0 + 17.0, n.1 + g.1 + 31.0),
                );
                let r = (g.0 + o.0 - f.0, g.1 + o.1 - f.1);
                let d = r.0 * r.0 + r.1 * r.1;

                if d < min_dist {
                    second_dist = min_dist;
                    min_dist = d;
                } else if d < second_dist {
                    second_dist = d;
                }
            }
        }

        (min_dist.sqrt(), second_dist.sqrt())
    }

    fn hash2d(&self, x: f64, y: f64) -> f64 {
        let p = Vec2::new(x as f32, y as f32);
        let p3 = (Vec3::new(p.x, p.y, p.x) * 0.1031).fract();
        let p3 = p3 + Vec3::splat(p3.dot(Vec3::new(p3.y + 33.33, p3.z + 33.33, p3.x + 33.33)));
        ((p3.x + p3.y) * p3.z).fract() as f64
    }

    fn smooth_step(&self, edge0: f64, edge1: f64, x: f64) -> f64 {
        let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }

    /// 0 on a crack, 1 away from it.
    fn crack_pattern(&self, u: f64, v: f64) -> f64 {
        let (min_dist, second_dist) = self.voronoi(u, v);
        let edge = second_dist - min_dist;
        self.smooth_step(0.02, 0.06, edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_texture_has_requested_size() {
        let generator = TextureGenerator::new(7);
        let tex = generator.generate_ground(GroundKind::Rock, 32, 16, &GroundTextureConfig::default());
        assert_eq!(tex.pixels.len(), 32 * 16);
        assert_eq!(tex.to_bytes().len(), 32 * 16 * 4);
        assert!(tex.pixels.iter().all(|p| p.a == 255));
    }

    #[test]
    fn grass_is_greener_than_rock() {
        let generator = TextureGenerator::new(7);
        let config = GroundTextureConfig::default();
        let grass = generator.generate_ground(GroundKind::Grass, 32, 32, &config).average_rgb();
        let rock = generator.generate_ground(GroundKind::Rock, 32, 32, &config).average_rgb();
        assert!(grass.y > grass.x && grass.y > grass.z);
        assert!(grass.y - grass.x > rock.y - rock.x);
    }

    #[test]
    fn same_seed_same_texture() {
        let config = GroundTextureConfig::default();
        let a = TextureGenerator::new(3).generate_ground(GroundKind::Grass, 16, 16, &config);
        let b = TextureGenerator::new(3).generate_ground(GroundKind::Grass, 16, 16, &config);
        assert_eq!(a.pixels, b.pixels);
    }
}
