/// Software render-to-texture for the capture rig
use nalgebra::{Matrix4, Point3};

use crate::capture::{Axis, CaptureRig, ClipWindow, RasterCapture};
use crate::geometry::{Mesh, Rgba8};
use crate::slice::SliceBuffer;

/// Pixel-space triangle area below which a triangle counts as edge-on.
const MIN_AREA: f32 = 1e-6;

/// Rasterizes a colored mesh from the three capture cameras.
///
/// Pixel centers land exactly on voxel centers. A fragment is kept when its
/// view depth falls inside the camera's clip window; the nearest fragment
/// wins. Uncovered pixels read back as transparent black.
pub struct SoftwareCapture {
    mesh: Mesh,
    size: usize,
    voxel_len: f32,
    views: [Matrix4<f32>; 3],
    clips: [ClipWindow; 3],
    active: bool,
    depth: Vec<f32>,
}

impl SoftwareCapture {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            size: 0,
            voxel_len: 1.0,
            views: [Matrix4::identity(); 3],
            clips: [ClipWindow { near: 0.0, far: 0.0 }; 3],
            active: false,
            depth: Vec::new(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Swap the captured model; takes effect on the next readback.
    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = mesh;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// View-space point to continuous pixel coordinates plus view depth.
    fn to_pixel(&self, view: &Matrix4<f32>, p: &Point3<f32>) -> (f32, f32, f32) {
        let v = view.transform_point(p);
        let half = self.size as f32 / 2.0 - 0.5;
        (v.x / self.voxel_len + half, v.y / self.voxel_len + half, -v.z)
    }

    fn rasterize_triangle(
        &mut self,
        coords: &[(f32, f32, f32); 3],
        clip: ClipWindow,
        color: Rgba8,
        target: &mut SliceBuffer,
    ) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Skip triangles entirely in front of or behind the slab.
        let min_d = v0.2.min(v1.2).min(v2.2);
        let max_d = v0.2.max(v1.2).max(v2.2);
        if max_d < clip.near || min_d >= clip.far {
            return;
        }

        let last = self.size as i32 - 1;
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(last);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(last);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32, y as f32);
                // Edge-on triangles cover no pixels.
                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p)
                else {
                    return;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                if !clip.contains(depth) {
                    continue;
                }

                let idx = y as usize * self.size + x as usize;
                if depth < self.depth[idx] {
                    self.depth[idx] = depth;
                    target.set_pixel(x as usize, y as usize, color);
                }
            }
        }
    }
}

impl RasterCapture for SoftwareCapture {
    fn configure(&mut self, rig: &CaptureRig) {
        self.size = rig.size();
        self.voxel_len = rig.voxel_len();
        for axis in Axis::ALL {
            self.views[axis.index()] = rig.camera(axis).view_matrix();
        }
        self.depth = vec![f32::INFINITY; self.size * self.size];
        self.active = true;
    }

    fn set_clip(&mut self, axis: Axis, window: ClipWindow) {
        self.clips[axis.index()] = window;
    }

    fn read_pixels(&mut self, axis: Axis, target: &mut SliceBuffer) {
        target.clear();
        if !self.active || target.size() != self.size {
            return;
        }
        self.depth.fill(f32::INFINITY);

        let view = self.views[axis.index()];
        let clip = self.clips[axis.index()];
        let triangles = std::mem::take(&mut self.mesh.triangles);
        for triangle in &triangles {
            let coords = [
                self.to_pixel(&view, &triangle.vertices[0].position),
                self.to_pixel(&view, &triangle.vertices[1].position),
                self.to_pixel(&view, &triangle.vertices[2].position),
            ];
            self.rasterize_triangle(&coords, clip, triangle.color, target);
        }
        self.mesh.triangles = triangles;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < MIN_AREA {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Triangle, Vertex};

    /// Small triangle facing +z whose interior holds the center of voxel
    /// `(3, 5, 7)` of a 12 grid.
    fn marker() -> Mesh {
        let len = 1.0 / 12.0;
        let (cx, cy, cz) = (3.0 * len - 0.5, 5.0 * len - 0.5, 7.0 * len - 0.5);
        let h = len / 4.0;
        let v = |x: f32, y: f32| Vertex::new(cx + x, cy + y, cz, 0.0, 0.0, 1.0);
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(v(-h, -h), v(h, -h), v(0.0, h)));
        mesh.painted([200, 100, 50, 255])
    }

    fn capture_slice(
        capture: &mut SoftwareCapture,
        rig: &CaptureRig,
        axis: Axis,
        index: usize,
    ) -> SliceBuffer {
        let mut slice = SliceBuffer::new(rig.size());
        capture.set_clip(axis, rig.clip_window(index));
        capture.read_pixels(axis, &mut slice);
        slice
    }

    #[test]
    fn test_facing_camera_hits_one_pixel_on_its_slice() {
        let rig = CaptureRig::new(12);
        let mut capture = SoftwareCapture::new(marker());
        capture.configure(&rig);

        let slice = capture_slice(&mut capture, &rig, Axis::Z, 7);
        assert_eq!(slice.pixel(3, 5), [200, 100, 50, 255]);
        let lit = slice.as_bytes().chunks(4).filter(|p| p[3] > 0).count();
        assert_eq!(lit, 1);

        let other = capture_slice(&mut capture, &rig, Axis::Z, 6);
        assert!(other.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_edge_on_triangles_are_invisible() {
        let rig = CaptureRig::new(12);
        let mut capture = SoftwareCapture::new(marker());
        capture.configure(&rig);
        for index in 0..12 {
            let slice = capture_slice(&mut capture, &rig, Axis::X, index);
            assert!(slice.as_bytes().iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_inactive_capture_reads_blank() {
        let rig = CaptureRig::new(12);
        let mut capture = SoftwareCapture::new(marker());
        capture.configure(&rig);
        capture.deactivate();
        let slice = capture_slice(&mut capture, &rig, Axis::Z, 7);
        assert!(slice.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }
}
