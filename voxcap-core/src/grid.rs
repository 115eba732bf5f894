/// Cubic RGBA accumulation grid
use crate::geometry::Rgba8;

/// Summed RGBA samples of one voxel.
///
/// Channels are un-normalized sums over every pixel deposited into the cell;
/// divide by alpha to recover the average color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell(pub [u32; 4]);

impl Cell {
    pub fn is_occupied(&self) -> bool {
        self.0[3] > 0
    }

    pub fn add(&mut self, rgba: Rgba8) {
        for (sum, &c) in self.0.iter_mut().zip(rgba.iter()) {
            *sum += c as u32;
        }
    }

    /// `(r/a, g/a, b/a, 1)`; `None` for an unoccupied cell.
    pub fn average_color(&self) -> Option<[f32; 4]> {
        if !self.is_occupied() {
            return None;
        }
        let a = self.0[3] as f32;
        Some([
            self.0[0] as f32 / a,
            self.0[1] as f32 / a,
            self.0[2] as f32 / a,
            1.0,
        ])
    }
}

/// `size³` cells stored x-major: `(x * size + y) * size + z`.
#[derive(Debug, Clone, Default)]
pub struct VoxelGrid {
    size: usize,
    cells: Vec<Cell>,
}

impl VoxelGrid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::default(); size * size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.size && y < self.size && z < self.size);
        (x * self.size + y) * self.size + z
    }

    pub fn cell(&self, x: usize, y: usize, z: usize) -> Cell {
        self.cells[self.index(x, y, z)]
    }

    pub fn accumulate(&mut self, x: usize, y: usize, z: usize, rgba: Rgba8) {
        let i = self.index(x, y, z);
        self.cells[i].add(rgba);
    }

    /// Occupied cells with their coordinates, x outer, y middle, z inner.
    pub fn occupied(&self) -> impl Iterator<Item = ([usize; 3], Cell)> + '_ {
        let n = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_occupied())
            .map(move |(i, &cell)| ([i / (n * n), (i / n) % n, i % n], cell))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = VoxelGrid::new(12);
        assert_eq!(grid.size(), 12);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn test_accumulate_sums() {
        let mut grid = VoxelGrid::new(4);
        grid.accumulate(1, 2, 3, [10, 20, 30, 255]);
        grid.accumulate(1, 2, 3, [30, 20, 10, 255]);
        assert_eq!(grid.cell(1, 2, 3), Cell([40, 40, 40, 510]));
    }

    #[test]
    fn test_occupied_order_and_coordinates() {
        let mut grid = VoxelGrid::new(3);
        grid.accumulate(2, 0, 1, [0, 0, 0, 1]);
        grid.accumulate(0, 2, 2, [0, 0, 0, 1]);
        grid.accumulate(0, 1, 0, [0, 0, 0, 1]);
        let coords: Vec<[usize; 3]> = grid.occupied().map(|(c, _)| c).collect();
        assert_eq!(coords, vec![[0, 1, 0], [0, 2, 2], [2, 0, 1]]);
    }

    #[test]
    fn test_color_without_alpha_is_unoccupied() {
        let mut grid = VoxelGrid::new(2);
        grid.accumulate(0, 0, 0, [255, 255, 255, 0]);
        assert!(!grid.cell(0, 0, 0).is_occupied());
        assert!(grid.cell(0, 0, 0).average_color().is_none());
    }

    #[test]
    fn test_average_color() {
        let cell = Cell([255, 0, 100, 255]);
        let color = cell.average_color().unwrap();
        assert!((color[0] - 1.0).abs() < 1e-6);
        assert_eq!(color[1], 0.0);
        assert!((color[2] - 100.0 / 255.0).abs() < 1e-6);
        assert_eq!(color[3], 1.0);
    }

    #[test]
    fn test_average_color_bound() {
        // Worst case: full color over the faintest alpha.
        let mut cell = Cell::default();
        for _ in 0..3 {
            cell.add([255, 255, 255, 1]);
        }
        let color = cell.average_color().unwrap();
        assert!(color[..3].iter().all(|&c| (0.0..=255.0).contains(&c)));
    }
}
