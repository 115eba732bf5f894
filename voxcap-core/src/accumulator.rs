/// Slice-by-slice deposition of captured pixels into the voxel grid
use crate::capture::{Axis, CaptureRig, RasterCapture};
use crate::grid::VoxelGrid;
use crate::slice::SliceBuffer;

/// Owns the grid, the slice scratch buffer and the capture cursor.
#[derive(Debug, Default)]
pub struct VoxelAccumulator {
    grid: VoxelGrid,
    slice: SliceBuffer,
    rig: Option<CaptureRig>,
    cursor: usize,
}

impl VoxelAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any in-flight capture and start over on a zeroed
    /// `size³` grid.
    pub fn begin_capture(&mut self, size: usize) -> CaptureRig {
        let rig = CaptureRig::new(size);
        self.grid = VoxelGrid::new(size);
        self.slice = SliceBuffer::new(size);
        self.rig = Some(rig);
        self.cursor = 0;
        log::debug!("capture restarted on a {size}^3 grid");
        rig
    }

    /// Capture depth slice `cursor` on all three axes and deposit it.
    ///
    /// Returns `true` exactly when the final slice has been deposited. Calls
    /// made once capture is complete (or before `begin_capture`) do nothing.
    pub fn capture_one_slice<C: RasterCapture>(&mut self, capture: &mut C) -> bool {
        let Some(rig) = self.rig else {
            return false;
        };
        if self.is_complete() {
            return false;
        }

        let index = self.cursor;
        let window = rig.clip_window(index);
        for axis in Axis::ALL {
            capture.set_clip(axis, window);
        }
        for axis in Axis::ALL {
            capture.read_pixels(axis, &mut self.slice);
            deposit(&mut self.grid, axis, index, &self.slice);
        }

        self.cursor += 1;
        self.is_complete()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn rig(&self) -> Option<&CaptureRig> {
        self.rig.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.rig.is_some() && self.cursor >= self.grid.size()
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Drop the grid and scratch buffer.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

/// Add every pixel of one axis' slice at depth `index` into the grid.
pub fn deposit(grid: &mut VoxelGrid, axis: Axis, index: usize, slice: &SliceBuffer) {
    let size = grid.size();
    debug_assert_eq!(slice.size(), size);
    let Some(last) = size.checked_sub(1) else {
        return;
    };
    for u in 0..size {
        for v in 0..size {
            let rgba = slice.pixel(u, v);
            if rgba == [0; 4] {
                continue;
            }
            let [x, y, z] = axis.map_pixel(u, v, index, last);
            grid.accumulate(x, y, z, rgba);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ClipWindow;
    use crate::grid::Cell;

    /// Serves one marker pixel per axis on a chosen slice.
    struct MarkerCapture {
        marker_slice: usize,
        rig: Option<CaptureRig>,
        clip: [Option<ClipWindow>; 3],
        reads: usize,
    }

    impl MarkerCapture {
        fn new(marker_slice: usize) -> Self {
            Self {
                marker_slice,
                rig: None,
                clip: [None; 3],
                reads: 0,
            }
        }
    }

    impl RasterCapture for MarkerCapture {
        fn configure(&mut self, rig: &CaptureRig) {
            self.rig = Some(*rig);
        }

        fn set_clip(&mut self, axis: Axis, window: ClipWindow) {
            self.clip[axis.index()] = Some(window);
        }

        fn read_pixels(&mut self, axis: Axis, target: &mut SliceBuffer) {
            self.reads += 1;
            target.clear();
            let rig = self.rig.unwrap();
            if self.clip[axis.index()] == Some(rig.clip_window(self.marker_slice)) {
                target.set_pixel(3, 5, [10, 20, 30, 255]);
            }
        }

        fn deactivate(&mut self) {}
    }

    #[test]
    fn test_marker_lands_per_axis_table() {
        let mut grid = VoxelGrid::new(16);
        let mut slice = SliceBuffer::new(16);
        slice.set_pixel(3, 5, [1, 1, 1, 1]);
        deposit(&mut grid, Axis::X, 7, &slice);
        assert_eq!(grid.occupied().map(|(c, _)| c).collect::<Vec<_>>(), vec![[7, 5, 12]]);
    }

    #[test]
    fn test_accumulation_is_order_independent() {
        let mut slice = SliceBuffer::new(4);
        slice.set_pixel(0, 0, [9, 8, 7, 200]);
        slice.set_pixel(1, 3, [50, 60, 70, 255]);
        slice.set_pixel(2, 2, [1, 2, 3, 4]);

        let orders = [
            [Axis::X, Axis::Y, Axis::Z],
            [Axis::Z, Axis::Y, Axis::X],
            [Axis::Y, Axis::X, Axis::Z],
        ];
        let grids: Vec<Vec<Cell>> = orders
            .iter()
            .map(|order| {
                let mut grid = VoxelGrid::new(4);
                for &axis in order {
                    deposit(&mut grid, axis, 2, &slice);
                }
                let mut cells = Vec::new();
                for x in 0..4 {
                    for y in 0..4 {
                        for z in 0..4 {
                            cells.push(grid.cell(x, y, z));
                        }
                    }
                }
                cells
            })
            .collect();
        assert_eq!(grids[0], grids[1]);
        assert_eq!(grids[0], grids[2]);
    }

    #[test]
    fn test_capture_sweeps_every_slice() {
        let mut capture = MarkerCapture::new(4);
        let mut accumulator = VoxelAccumulator::new();
        let rig = accumulator.begin_capture(12);
        capture.configure(&rig);

        let mut completions = 0;
        for _ in 0..20 {
            if accumulator.capture_one_slice(&mut capture) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(accumulator.cursor(), 12);
        assert_eq!(capture.reads, 12 * 3);

        let grid = accumulator.grid();
        assert_eq!(grid.cell(4, 5, 8), Cell([10, 20, 30, 255]));
        assert_eq!(grid.cell(3, 4, 6), Cell([10, 20, 30, 255]));
        assert_eq!(grid.cell(3, 5, 4), Cell([10, 20, 30, 255]));
        assert_eq!(grid.occupied_count(), 3);
    }

    #[test]
    fn test_begin_capture_discards_state() {
        let mut capture = MarkerCapture::new(0);
        let mut accumulator = VoxelAccumulator::new();
        capture.configure(&accumulator.begin_capture(12));
        accumulator.capture_one_slice(&mut capture);
        assert_eq!(accumulator.grid().occupied_count(), 3);

        capture.configure(&accumulator.begin_capture(20));
        assert_eq!(accumulator.cursor(), 0);
        assert_eq!(accumulator.size(), 20);
        assert_eq!(accumulator.grid().occupied_count(), 0);
    }

    #[test]
    fn test_no_capture_before_begin() {
        let mut capture = MarkerCapture::new(0);
        let mut accumulator = VoxelAccumulator::new();
        assert!(!accumulator.capture_one_slice(&mut capture));
        assert_eq!(capture.reads, 0);
    }
}
