//! Fixed-topology terrain patch whose heights are resampled from a [`HeightField`].
//!
//! Normals are computed on a PADDED grid (one extra ring of vertices sampled
//! from the same world-space height field) so edge normals include the faces
//! that belong to the neighbouring tile. Adjoining patches therefore agree on
//! both height and normal along shared edges.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::error::TerrainError;
use crate::height::{Coefficients, HeightField};

/// Largest accepted quads-per-side. Keeps one patch around half a gigabyte of
/// vertices and every index well inside `u32`.
pub const MAX_PATCH_RESOLUTION: u32 = 4096;

/// Vertex for the terrain patch mesh. Layout matches `renderer::Vertex` so the
/// buffer can be uploaded without conversion.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// A `(resolution + 1)²` vertex grid spanning `tile_width × tile_width` in the
/// local XZ plane, facing +Y. Only vertex attributes change after `build`.
#[derive(Debug, Clone)]
pub struct PatchMesh {
    resolution: u32,
    tile_width: f32,
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    /// Local X (and Z) coordinate per padded column, shared by both axes.
    padded_coords: Vec<f32>,
    /// Heights of the padded `(resolution + 3)²` grid, reused every update.
    padded_heights: Vec<f32>,
    /// Face-normal accumulator over the padded grid, reused every update.
    normal_accum: Vec<Vec3>,
    dirty: bool,
}

impl PatchMesh {
    /// Allocate the grid with every height at zero and normals pointing up.
    pub fn build(resolution: u32, tile_width: f32) -> Result<Self, TerrainError> {
        if resolution == 0 || resolution > MAX_PATCH_RESOLUTION {
            return Err(TerrainError::InvalidResolution(resolution));
        }
        if !tile_width.is_finite() || tile_width <= 0.0 {
            return Err(TerrainError::InvalidTileWidth(tile_width));
        }

        let res = resolution as usize;
        let side = res + 1;
        let padded_side = side + 2;

        let padded_coords: Vec<f32> = (0..padded_side)
            .map(|p| local_coord(p as i64 - 1, resolution, tile_width))
            .collect();

        let mut vertices = Vec::with_capacity(side * side);
        for iy in 0..side {
            for ix in 0..side {
                vertices.push(TerrainVertex {
                    position: [padded_coords[ix + 1], 0.0, padded_coords[iy + 1]],
                    normal: [0.0, 1.0, 0.0],
                    uv: [
                        ix as f32 / resolution as f32,
                        1.0 - iy as f32 / resolution as f32,
                    ],
                });
            }
        }

        let mut indices = Vec::with_capacity(res * res * 6);
        for iy in 0..res {
            for ix in 0..res {
                let a = (iy * side + ix) as u32;
                let b = ((iy + 1) * side + ix) as u32;
                let c = b + 1;
                let d = a + 1;

                indices.extend_from_slice(&[a, b, d]);
                indices.extend_from_slice(&[b, c, d]);
            }
        }

        Ok(Self {
            resolution,
            tile_width,
            vertices,
            indices,
            padded_coords,
            padded_heights: vec![0.0; padded_side * padded_side],
            normal_accum: vec![Vec3::ZERO; padded_side * padded_side],
            dirty: true,
        })
    }

    /// Resample every vertex height at `local + world_offset` and recompute normals.
    /// `world_offset.y` is applied along world Z.
    pub fn update_heights(
        &mut self,
        field: &HeightField,
        world_offset: Vec2,
        coefficients: &Coefficients,
    ) {
        let side = self.resolution as usize + 1;
        let padded_side = side + 2;

        for pz in 0..padded_side {
            let world_z = (self.padded_coords[pz] + world_offset.y) as f64;
            for px in 0..padded_side {
                let world_x = (self.padded_coords[px] + world_offset.x) as f64;
                self.padded_heights[pz * padded_side + px] =
                    field.elevation(world_x, world_z, coefficients) as f32;
            }
        }

        for iy in 0..side {
            for ix in 0..side {
                self.vertices[iy * side + ix].position[1] =
                    self.padded_heights[(iy + 1) * padded_side + ix + 1];
            }
        }

        self.recalculate_normals();
        self.dirty = true;
        log::trace!("patch {}x{} heights updated at {:?}", side, side, world_offset);
    }

    /// Area-weighted vertex normals: unnormalised face normals are summed per
    /// vertex, so larger faces contribute more. Degenerate sums fall back to +Y.
    fn recalculate_normals(&mut self) {
        let side = self.resolution as usize + 1;
        let padded_side = side + 2;
        let coords = &self.padded_coords;
        let heights = &self.padded_heights;
        let position = |px: usize, pz: usize| {
            Vec3::new(coords[px], heights[pz * padded_side + px], coords[pz])
        };

        self.normal_accum.fill(Vec3::ZERO);
        for pz in 0..(padded_side - 1) {
            for px in 0..(padded_side - 1) {
                let ia = pz * padded_side + px;
                let ib = (pz + 1) * padded_side + px;
                let ic = ib + 1;
                let id = ia + 1;

                let a = position(px, pz);
                let b = position(px, pz + 1);
                let c = position(px + 1, pz + 1);
                let d = position(px + 1, pz);

                // Triangle (a, b, d)
                let n1 = (b - a).cross(d - a);
                self.normal_accum[ia] += n1;
                self.normal_accum[ib] += n1;
                self.normal_accum[id] += n1;

                // Triangle (b, c, d)
                let n2 = (c - b).cross(d - b);
                self.normal_accum[ib] += n2;
                self.normal_accum[ic] += n2;
                self.normal_accum[id] += n2;
            }
        }

        for iy in 0..side {
            for ix in 0..side {
                let n = self.normal_accum[(iy + 1) * padded_side + ix + 1]
                    .try_normalize()
                    .unwrap_or(Vec3::Y);
                self.vertices[iy * side + ix].normal = n.to_array();
            }
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Index of grid vertex `(ix, iy)`, both in `0..=resolution`.
    pub fn vertex_index(&self, ix: u32, iy: u32) -> usize {
        iy as usize * (self.resolution as usize + 1) + ix as usize
    }

    pub fn vertex(&self, ix: u32, iy: u32) -> &TerrainVertex {
        &self.vertices[self.vertex_index(ix, iy)]
    }

    pub fn height_at(&self, ix: u32, iy: u32) -> f32 {
        self.vertex(ix, iy).position[1]
    }

    /// Clear and return the dirty flag. The renderer re-uploads when this is true.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Local coordinate of grid line `i` (may lie one step outside `0..=resolution`).
/// Written as a fraction of the width so both edges land exactly on `±width / 2`.
#[inline]
fn local_coord(i: i64, resolution: u32, tile_width: f32) -> f32 {
    (i as f32 / resolution as f32 - 0.5) * tile_width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_allocates_grid_and_topology() {
        let mesh = PatchMesh::build(4, 100.0).unwrap();
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.indices().len(), 4 * 4 * 6);
        assert_eq!(mesh.vertex(0, 0).position, [-50.0, 0.0, -50.0]);
        assert_eq!(mesh.vertex(4, 4).position, [50.0, 0.0, 50.0]);
        assert_eq!(mesh.vertex(2, 2).position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertex(0, 0).uv, [0.0, 1.0]);
        assert_eq!(mesh.vertex(4, 4).uv, [1.0, 0.0]);
        assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn flat_grid_faces_up() {
        let mesh = PatchMesh::build(3, 30.0).unwrap();
        let v = mesh.vertices();
        for tri in mesh.indices().chunks(3) {
            let a = Vec3::from(v[tri[0] as usize].position);
            let b = Vec3::from(v[tri[1] as usize].position);
            let c = Vec3::from(v[tri[2] as usize].position);
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert_eq!(PatchMesh::build(0, 100.0).unwrap_err(), TerrainError::InvalidResolution(0));
        assert_eq!(PatchMesh::build(4, 0.0).unwrap_err(), TerrainError::InvalidTileWidth(0.0));
        assert!(PatchMesh::build(4, -1.0).is_err());
        assert!(PatchMesh::build(4, f32::INFINITY).is_err());
    }

    #[test]
    fn rejects_oversized_resolution_before_allocating() {
        for resolution in [MAX_PATCH_RESOLUTION + 1, 70_000, u32::MAX] {
            assert_eq!(
                PatchMesh::build(resolution, 100.0).unwrap_err(),
                TerrainError::InvalidResolution(resolution)
            );
        }
        let side = MAX_PATCH_RESOLUTION as u64 + 1;
        assert!(side * side <= u32::MAX as u64);
    }

    #[test]
    fn center_height_matches_closed_form() {
        let field = HeightField::default();
        let c = Coefficients::new(1.0, 2.0, 8.0);
        let mut mesh = PatchMesh::build(4, 100.0).unwrap();
        mesh.update_heights(&field, Vec2::ZERO, &c);

        let n = field.noise();
        let expected = n.evaluate(0.0, 0.0) / 60.0
            + n.evaluate(0.0, 0.0) * 1.0
            + n.evaluate(0.0, 0.0) * 2.0
            + n.evaluate(0.0, 0.0) * 8.0;
        assert!((mesh.height_at(2, 2) as f64 - expected).abs() < 1e-5);
    }

    #[test]
    fn heights_are_sampled_in_world_space() {
        let field = HeightField::default();
        let c = Coefficients::default();
        let offset = Vec2::new(-50.0, 50.0);
        let mut mesh = PatchMesh::build(8, 100.0).unwrap();
        mesh.update_heights(&field, offset, &c);
        for v in mesh.vertices() {
            let expected = field.elevation(
                (v.position[0] + offset.x) as f64,
                (v.position[2] + offset.y) as f64,
                &c,
            ) as f32;
            assert_eq!(v.position[1], expected);
        }
    }

    #[test]
    fn update_is_idempotent() {
        let field = HeightField::default();
        let c = Coefficients::new(0.4, 1.1, 3.0);
        let mut mesh = PatchMesh::build(16, 100.0).unwrap();
        mesh.update_heights(&field, Vec2::new(50.0, -50.0), &c);
        let first = mesh.vertices().to_vec();
        mesh.update_heights(&field, Vec2::new(50.0, -50.0), &c);
        assert_eq!(first.as_slice(), mesh.vertices());
    }

    #[test]
    fn normals_are_unit_and_upward() {
        let field = HeightField::default();
        let mut mesh = PatchMesh::build(32, 100.0).unwrap();
        mesh.update_heights(&field, Vec2::ZERO, &Coefficients::default());
        for v in mesh.vertices() {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.y > 0.0);
        }
    }

    #[test]
    fn update_marks_dirty_until_taken() {
        let field = HeightField::default();
        let mut mesh = PatchMesh::build(2, 10.0).unwrap();
        assert!(mesh.take_dirty());
        assert!(!mesh.dirty);
        mesh.update_heights(&field, Vec2::ZERO, &Coefficients::default());
        assert!(mesh.take_dirty());
        assert!(!mesh.take_dirty());
    }

    #[test]
    fn topology_survives_updates() {
        let field = HeightField::default();
        let mut mesh = PatchMesh::build(6, 60.0).unwrap();
        let indices = mesh.indices().to_vec();
        let count = mesh.vertex_count();
        for step in 0..3 {
            mesh.update_heights(&field, Vec2::ZERO, &Coefficients::splat(step as f64));
        }
        assert_eq!(mesh.indices(), indices.as_slice());
        assert_eq!(mesh.vertex_count(), count);
    }
}
