//! A patch placed at a world offset.

use engine_core::Transform;
use glam::{Vec2, Vec3};

use crate::error::TerrainError;
use crate::height::{Coefficients, HeightField};
use crate::patch::PatchMesh;

/// Offsets of a 2×2 block of tiles of width `tile_width`, centred on the origin.
/// Neighbours differ by exactly one tile width, so their grids share edges.
pub fn tile_offsets_2x2(tile_width: f32) -> [Vec2; 4] {
    let h = 0.5 * tile_width;
    [
        Vec2::new(-h, -h),
        Vec2::new(h, -h),
        Vec2::new(-h, h),
        Vec2::new(h, h),
    ]
}

/// One terrain patch and its world placement. `offset.y` maps to world Z.
#[derive(Debug, Clone)]
pub struct TerrainTile {
    mesh: PatchMesh,
    offset: Vec2,
}

impl TerrainTile {
    pub fn new(resolution: u32, tile_width: f32, offset: Vec2) -> Result<Self, TerrainError> {
        Ok(Self {
            mesh: PatchMesh::build(resolution, tile_width)?,
            offset,
        })
    }

    /// Resample the patch at this tile's world position.
    pub fn rebuild(&mut self, field: &HeightField, coefficients: &Coefficients) {
        self.mesh.update_heights(field, self.offset, coefficients);
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn mesh(&self) -> &PatchMesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut PatchMesh {
        &mut self.mesh
    }

    /// Model transform placing the local grid at `(offset.x, 0, offset.y)`.
    pub fn transform(&self) -> Transform {
        Transform::from_position(Vec3::new(self.offset.x, 0.0, self.offset.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built(offset: Vec2, resolution: u32) -> TerrainTile {
        let mut tile = TerrainTile::new(resolution, 100.0, offset).unwrap();
        tile.rebuild(&HeightField::default(), &Coefficients::default());
        tile
    }

    #[test]
    fn offsets_form_contiguous_block() {
        let o = tile_offsets_2x2(100.0);
        assert_eq!(o[0], Vec2::new(-50.0, -50.0));
        assert_eq!(o[1] - o[0], Vec2::new(100.0, 0.0));
        assert_eq!(o[2] - o[0], Vec2::new(0.0, 100.0));
        assert_eq!(o[3], Vec2::new(50.0, 50.0));
    }

    #[test]
    fn seam_heights_match_along_x() {
        let res = 16;
        let left = built(Vec2::new(-50.0, -50.0), res);
        let right = built(Vec2::new(50.0, -50.0), res);
        for iy in 0..=res {
            assert_eq!(left.mesh().height_at(res, iy), right.mesh().height_at(0, iy));
        }
    }

    #[test]
    fn seam_heights_match_along_z() {
        let res = 16;
        let near = built(Vec2::new(50.0, -50.0), res);
        let far = built(Vec2::new(50.0, 50.0), res);
        for ix in 0..=res {
            assert_eq!(near.mesh().height_at(ix, res), far.mesh().height_at(ix, 0));
        }
    }

    #[test]
    fn seam_normals_match() {
        let res = 4;
        let left = built(Vec2::new(-50.0, 50.0), res);
        let right = built(Vec2::new(50.0, 50.0), res);
        for iy in 0..=res {
            let a = Vec3::from(left.mesh().vertex(res, iy).normal);
            let b = Vec3::from(right.mesh().vertex(0, iy).normal);
            assert!((a - b).length() < 1e-5, "normals differ at row {}: {} vs {}", iy, a, b);
        }
    }

    #[test]
    fn transform_places_tile_at_offset() {
        let tile = TerrainTile::new(2, 100.0, Vec2::new(-50.0, 50.0)).unwrap();
        assert_eq!(tile.transform().position, Vec3::new(-50.0, 0.0, 50.0));
    }
}
