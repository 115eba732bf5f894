/// The reference shape stamped at every occupied voxel
use nalgebra::{Point3, Vector3};

use crate::error::{Result, VoxelizeError};
use crate::geometry::{Bounds, Mesh};

/// Immutable stamp geometry: positions, triangle indices and bounds.
#[derive(Debug, Clone)]
pub struct UnitTemplate {
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
    bounds: Bounds,
}

impl UnitTemplate {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Result<Self> {
        if positions.is_empty() || indices.is_empty() {
            return Err(VoxelizeError::EmptyTemplate);
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(VoxelizeError::TemplateIndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }

        let points: Vec<Point3<f32>> = positions.iter().map(|&p| Point3::from(p)).collect();
        let bounds = Bounds::from_points(&points).ok_or(VoxelizeError::EmptyTemplate)?;

        Ok(Self {
            positions,
            indices,
            bounds,
        })
    }

    /// Unindexed copy of a triangle mesh: three vertices per triangle.
    pub fn from_mesh(mesh: &Mesh) -> Result<Self> {
        let positions: Vec<[f32; 3]> = mesh
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| v.position.coords.into()))
            .collect();
        let indices = (0..positions.len() as u32).collect();
        Self::new(positions, indices)
    }

    /// Unit cube centered at the origin, 8 shared corners and 12 triangles.
    pub fn cube() -> Self {
        let h = 0.5;
        let positions = vec![
            [-h, -h, -h],
            [h, -h, -h],
            [h, h, -h],
            [-h, h, -h],
            [-h, -h, h],
            [h, -h, h],
            [h, h, h],
            [-h, h, h],
        ];
        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +z
            1, 0, 3, 1, 3, 2, // -z
            3, 7, 6, 3, 6, 2, // +y
            0, 1, 5, 0, 5, 4, // -y
            1, 2, 6, 1, 6, 5, // +x
            0, 4, 7, 0, 7, 3, // -x
        ];
        let bounds = Bounds {
            min: Point3::new(-h, -h, -h),
            max: Point3::new(h, h, h),
        };
        Self {
            positions,
            indices,
            bounds,
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.bounds.extent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let cube = UnitTemplate::cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.index_count(), 36);
        assert!((cube.extent() - Vector3::new(1.0, 1.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            UnitTemplate::new(Vec::new(), vec![0]),
            Err(VoxelizeError::EmptyTemplate)
        ));
        assert!(matches!(
            UnitTemplate::new(vec![[0.0; 3]], Vec::new()),
            Err(VoxelizeError::EmptyTemplate)
        ));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let result = UnitTemplate::new(vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![0, 1, 2]);
        assert!(matches!(
            result,
            Err(VoxelizeError::TemplateIndexOutOfRange { index: 2, vertex_count: 2 })
        ));
    }

    #[test]
    fn test_from_mesh() {
        let template = UnitTemplate::from_mesh(&Mesh::cube(2.0)).unwrap();
        assert_eq!(template.vertex_count(), 36);
        assert_eq!(template.index_count(), 36);
        assert!((template.extent().y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_flat_template_has_zero_extent() {
        let quad = UnitTemplate::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            vec![0, 1, 2],
        )
        .unwrap();
        assert_eq!(quad.extent().z, 0.0);
    }
}
