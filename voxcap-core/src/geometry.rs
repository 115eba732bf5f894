/// Geometry primitives for models fed to the capture rig
use nalgebra::{Matrix4, Point3, Vector3};
use std::f32::consts::{PI, TAU};

use crate::transform::Transform;

/// RGBA color with unsigned-byte channels.
pub type Rgba8 = [u8; 4];

pub const WHITE: Rgba8 = [255, 255, 255, 255];

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A flat-colored triangle
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    pub color: Rgba8,
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
            color: WHITE,
        }
    }

    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Degenerate triangles yield a zero vector.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in points {
            bounds.min = bounds.min.inf(p);
            bounds.max = bounds.max.sup(p);
        }
        Some(bounds)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(
            self.triangles
                .iter()
                .flat_map(|t| t.vertices.iter().map(|v| &v.position)),
        )
    }

    /// Apply an affine transform to every vertex, re-deriving normals.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let normal_matrix = matrix
            .fixed_view::<3, 3>(0, 0)
            .clone_owned()
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(nalgebra::Matrix3::identity);

        let triangles = self
            .triangles
            .iter()
            .map(|t| {
                let mut out = t.clone();
                for v in &mut out.vertices {
                    v.position = matrix.transform_point(&v.position);
                    v.normal = (normal_matrix * v.normal)
                        .try_normalize(1e-12)
                        .unwrap_or(v.normal);
                }
                out
            })
            .collect();
        Self { triangles }
    }

    /// Set every triangle to one color.
    pub fn painted(mut self, color: Rgba8) -> Self {
        for t in &mut self.triangles {
            t.color = color;
        }
        self
    }

    /// Uniformly scale and center the model inside the `[-0.5, 0.5]` cube,
    /// leaving `margin` of free space on the longest axis.
    pub fn fit_unit_cube(&self, margin: f32) -> Self {
        match self.bounds().and_then(|b| Transform::fit_matrix(&b, margin)) {
            Some(matrix) => self.transformed(&matrix),
            None => self.clone(),
        }
    }

    /// Create an axis-aligned cube centered at the origin, two triangles
    /// per face wound counter-clockwise when seen from outside.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);

        for axis in 0..3 {
            let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
            for sign in [1.0f32, -1.0] {
                let mut normal = Vector3::zeros();
                normal[axis] = sign;
                let corner = |a: f32, b: f32| {
                    let mut p = normal * half;
                    p[u] = a * half * sign;
                    p[v] = b * half;
                    Vertex {
                        position: Point3::from(p),
                        normal,
                    }
                };
                let quad = [
                    corner(-1.0, -1.0),
                    corner(1.0, -1.0),
                    corner(1.0, 1.0),
                    corner(-1.0, 1.0),
                ];
                mesh.add_triangle(Triangle::new(quad[0], quad[1], quad[2]));
                mesh.add_triangle(Triangle::new(quad[0], quad[2], quad[3]));
            }
        }

        mesh
    }

    /// Create a UV sphere centered at the origin.
    ///
    /// Pole rings collapse to a single triangle per segment.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let point = |ring: u32, segment: u32| {
            let phi = PI * ring as f32 / rings as f32;
            let theta = TAU * segment as f32 / segments as f32;
            let n = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            let p = n * radius;
            Vertex::new(p.x, p.y, p.z, n.x, n.y, n.z)
        };

        let mut mesh = Self::with_capacity((segments * rings * 2) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let v0 = point(ring, segment);
                let v1 = point(ring, segment + 1);
                let v2 = point(ring + 1, segment);
                let v3 = point(ring + 1, segment + 1);

                if ring != 0 {
                    mesh.add_triangle(Triangle::new(v0, v1, v2));
                }
                if ring != rings - 1 {
                    mesh.add_triangle(Triangle::new(v1, v3, v2));
                }
            }
        }
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_bounds() {
        let bounds = Mesh::cube(2.0).bounds().unwrap();
        assert!((bounds.min - Point3::new(-1.0, -1.0, -1.0)).norm() < 1e-6);
        assert!((bounds.extent() - Vector3::new(2.0, 2.0, 2.0)).norm() < 1e-6);
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let mesh = Mesh::cube(1.0);
        assert_eq!(mesh.triangles.len(), 12);
        for t in &mesh.triangles {
            let normal = t.calculate_normal();
            assert!((normal - t.vertices[0].normal).norm() < 1e-6);
            let centroid = t.vertices.iter().map(|v| v.position.coords).sum::<Vector3<f32>>() / 3.0;
            assert!(centroid.dot(&normal) > 0.0);
        }
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_fit_unit_cube() {
        let mesh = Mesh::cube(10.0)
            .transformed(&Transform::translation_matrix(3.0, -2.0, 7.0))
            .fit_unit_cube(0.1);
        let bounds = mesh.bounds().unwrap();
        assert!(bounds.center().coords.norm() < 1e-5);
        assert!((bounds.extent().x - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_painted() {
        let mesh = Mesh::cube(1.0).painted([10, 20, 30, 255]);
        assert!(mesh.triangles.iter().all(|t| t.color == [10, 20, 30, 255]));
    }

    #[test]
    fn test_uv_sphere_radius() {
        let mesh = Mesh::uv_sphere(0.4, 12, 6);
        assert_eq!(mesh.triangles.len(), 12 * 6 * 2 - 2 * 12);
        for t in &mesh.triangles {
            for v in &t.vertices {
                assert!((v.position.coords.norm() - 0.4).abs() < 1e-5);
            }
        }
    }
}
