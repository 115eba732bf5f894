//! Capture rig: three orthographic cameras sweeping a one-voxel clip window
//! through the unit cube, and the host boundary that renders them.
//!
//! Every camera sits `0.5 + voxel_len / 2` along its axis and looks back
//! toward the origin. For slice `index` the clip window is
//! `[1 - index * voxel_len, 1 - index * voxel_len + voxel_len]`, which selects
//! the slab of world space centered on voxel plane `index`.

use nalgebra::{Point3, Vector3};

use crate::projection::Camera;
use crate::slice::SliceBuffer;

/// The three capture directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Camera up vector; together with the view direction it fixes how
    /// pixel rows and columns run through the grid.
    pub fn up(self) -> Vector3<f32> {
        match self {
            Axis::X | Axis::Z => Vector3::y(),
            Axis::Y => -Vector3::z(),
        }
    }

    /// Grid cell hit by slice pixel `(u, v)` at depth `index`, where `last`
    /// is `size - 1`.
    ///
    /// | axis | x     | y     | z        |
    /// |------|-------|-------|----------|
    /// | X    | index | v     | last - u |
    /// | Y    | u     | index | last - v |
    /// | Z    | u     | v     | index    |
    #[inline]
    pub fn map_pixel(self, u: usize, v: usize, index: usize, last: usize) -> [usize; 3] {
        match self {
            Axis::X => [index, v, last - u],
            Axis::Y => [u, index, last - v],
            Axis::Z => [u, v, index],
        }
    }
}

/// Near/far clip distances measured from a capture camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub near: f32,
    pub far: f32,
}

impl ClipWindow {
    pub fn contains(&self, depth: f32) -> bool {
        depth >= self.near && depth < self.far
    }
}

/// Camera placement for one grid resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRig {
    size: usize,
    voxel_len: f32,
}

impl CaptureRig {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            voxel_len: 1.0 / size.max(1) as f32,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn voxel_len(&self) -> f32 {
        self.voxel_len
    }

    /// Center of the voxel lattice. Voxel `i` sits at `i * voxel_len - 0.5`,
    /// so the lattice is offset half a voxel toward negative coordinates.
    pub fn grid_center(&self) -> Point3<f32> {
        let c = -self.voxel_len / 2.0;
        Point3::new(c, c, c)
    }

    pub fn camera_distance(&self) -> f32 {
        0.5 + self.voxel_len / 2.0
    }

    /// Camera on `axis`, centered laterally on the lattice so pixel centers
    /// line up with voxel centers.
    pub fn camera_position(&self, axis: Axis) -> Point3<f32> {
        let mut position = self.grid_center();
        position[axis.index()] = self.camera_distance();
        position
    }

    pub fn clip_window(&self, index: usize) -> ClipWindow {
        let near = 1.0 - index as f32 * self.voxel_len;
        ClipWindow {
            near,
            far: near + self.voxel_len,
        }
    }

    pub fn camera(&self, axis: Axis) -> Camera {
        let position = self.camera_position(axis);
        Camera::orthographic(position, position - axis.unit(), axis.up(), 1.0)
    }
}

/// Render-to-texture host used to capture slices.
///
/// The capture driver calls `configure` once per size change, then for each
/// slice `set_clip` on every axis followed by `read_pixels` on every axis.
/// Readback failures are not reported; a stale or blank readback simply
/// contributes nothing to the grid.
pub trait RasterCapture {
    /// Resize render targets to `rig.size()` squared, place and activate the
    /// three cameras.
    fn configure(&mut self, rig: &CaptureRig);

    fn set_clip(&mut self, axis: Axis, window: ClipWindow);

    /// Render `axis` with its current clip window into `target`.
    fn read_pixels(&mut self, axis: Axis, target: &mut SliceBuffer);

    /// Stop rendering the capture cameras.
    fn deactivate(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_mapping_table() {
        assert_eq!(Axis::X.map_pixel(3, 5, 7, 15), [7, 5, 12]);
        assert_eq!(Axis::Y.map_pixel(3, 5, 7, 15), [3, 7, 10]);
        assert_eq!(Axis::Z.map_pixel(3, 5, 7, 15), [3, 5, 7]);
    }

    #[test]
    fn test_clip_window_sweep() {
        let rig = CaptureRig::new(10);
        let first = rig.clip_window(0);
        assert!((first.near - 1.0).abs() < 1e-6);
        assert!((first.far - 1.1).abs() < 1e-6);
        let last = rig.clip_window(9);
        assert!((last.near - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_slab_centered_on_voxel_plane() {
        let rig = CaptureRig::new(16);
        let len = rig.voxel_len();
        for index in [0, 5, 15] {
            let window = rig.clip_window(index);
            let mid = rig.camera_distance() - (window.near + window.far) / 2.0;
            assert!((mid - (index as f32 * len - 0.5)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_camera_looks_at_origin_side() {
        let rig = CaptureRig::new(12);
        for axis in Axis::ALL {
            let camera = rig.camera(axis);
            let dir = camera.target - camera.position;
            assert!((dir + axis.unit()).norm() < 1e-6);
            assert!((camera.position[axis.index()] - rig.camera_distance()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_clip_window_contains() {
        let window = ClipWindow { near: 0.5, far: 0.6 };
        assert!(window.contains(0.5));
        assert!(window.contains(0.55));
        assert!(!window.contains(0.6));
        assert!(!window.contains(0.4));
    }
}
