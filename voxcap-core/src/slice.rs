/// Scratch buffer receiving one camera's slice readback
use crate::geometry::Rgba8;

/// Square RGBA byte buffer, pixel `(u, v)` at byte `(u + v * size) * 4`.
///
/// Overwritten by every readback; contents are only meaningful until the
/// next capture call.
#[derive(Debug, Clone, Default)]
pub struct SliceBuffer {
    size: usize,
    pixels: Vec<u8>,
}

impl SliceBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            pixels: vec![0; size * size * 4],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn offset(&self, u: usize, v: usize) -> usize {
        (u + v * self.size) * 4
    }

    pub fn pixel(&self, u: usize, v: usize) -> Rgba8 {
        let o = self.offset(u, v);
        [
            self.pixels[o],
            self.pixels[o + 1],
            self.pixels[o + 2],
            self.pixels[o + 3],
        ]
    }

    pub fn set_pixel(&mut self, u: usize, v: usize, rgba: Rgba8) {
        let o = self.offset(u, v);
        self.pixels[o..o + 4].copy_from_slice(&rgba);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Raw destination for a host readback.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_layout() {
        let mut slice = SliceBuffer::new(4);
        slice.set_pixel(1, 2, [1, 2, 3, 4]);
        assert_eq!(&slice.as_bytes()[36..40], &[1, 2, 3, 4]);
        assert_eq!(slice.pixel(1, 2), [1, 2, 3, 4]);
        assert_eq!(slice.pixel(2, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_clear() {
        let mut slice = SliceBuffer::new(2);
        slice.as_bytes_mut().fill(9);
        slice.clear();
        assert!(slice.as_bytes().iter().all(|&b| b == 0));
    }
}
