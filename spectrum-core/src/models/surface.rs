use std::ops::Range;

use super::error::CaptureError;

/// Memory order of the rows backing a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// First row in memory is the bottom edge (Win32 DIB style).
    BottomUp,
    /// First row in memory is the top edge.
    TopDown,
}

/// A mutable view over packed `0x00RRGGBB` pixel memory.
///
/// All coordinates are logical and bottom-up: `y = 0` is the bottom edge.
/// The surface maps them onto memory rows according to its [`RowOrder`].
///
/// Preconditions for every pixel accessor: `x < width`, `y < height`.
/// Violations panic through slice indexing.
pub struct Surface<'a> {
    pixels: &'a mut [u32],
    width: u32,
    height: u32,
    stride: usize,
    order: RowOrder,
}

impl<'a> Surface<'a> {
    /// Wrap `pixels`, where `stride` is the distance between rows in pixels.
    pub fn new(
        pixels: &'a mut [u32],
        width: u32,
        height: u32,
        stride: usize,
        order: RowOrder,
    ) -> Result<Self, CaptureError> {
        if stride < width as usize {
            return Err(CaptureError::InvariantViolation(format!(
                "stride {stride} shorter than width {width}"
            )));
        }
        let required = match height {
            0 => 0,
            h => stride * (h as usize - 1) + width as usize,
        };
        if pixels.len() < required {
            return Err(CaptureError::InvariantViolation(format!(
                "surface {width}x{height} needs {required} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
            stride,
            order,
        })
    }

    /// Tightly packed surface (`stride == width`).
    pub fn packed(pixels: &'a mut [u32], width: u32, height: u32, order: RowOrder) -> Result<Self, CaptureError> {
        Self::new(pixels, width, height, width as usize, order)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn row_offset(&self, y: u32) -> usize {
        let memory_row = match self.order {
            RowOrder::BottomUp => y,
            RowOrder::TopDown => self.height - 1 - y,
        };
        memory_row as usize * self.stride
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[self.row_offset(y) + x as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        let offset = self.row_offset(y) + x as usize;
        self.pixels[offset] = color;
    }

    /// The `width` pixels of logical row `y`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let start = self.row_offset(y);
        &mut self.pixels[start..start + self.width as usize]
    }

    /// Paint `rows` of column `x`.
    pub fn fill_column(&mut self, x: u32, rows: Range<u32>, color: u32) {
        for y in rows {
            self.set_pixel(x, y, color);
        }
    }

    pub fn fill(&mut self, color: u32) {
        for y in 0..self.height {
            self.row_mut(y).fill(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_up_row_zero_is_first_in_memory() {
        let mut pixels = vec![0u32; 6];
        let mut surface = Surface::packed(&mut pixels, 3, 2, RowOrder::BottomUp).unwrap();
        surface.set_pixel(1, 0, 7);
        assert_eq!(pixels[1], 7);
    }

    #[test]
    fn top_down_row_zero_is_last_in_memory() {
        let mut pixels = vec![0u32; 6];
        let mut surface = Surface::packed(&mut pixels, 3, 2, RowOrder::TopDown).unwrap();
        surface.set_pixel(1, 0, 7);
        assert_eq!(pixels[4], 7);
    }

    #[test]
    fn stride_skips_padding() {
        let mut pixels = vec![0u32; 8];
        let mut surface = Surface::new(&mut pixels, 3, 2, 4, RowOrder::BottomUp).unwrap();
        surface.row_mut(1).fill(9);
        assert_eq!(pixels, vec![0, 0, 0, 0, 9, 9, 9, 0]);
    }

    #[test]
    fn rejects_short_memory() {
        let mut pixels = vec![0u32; 5];
        assert!(Surface::packed(&mut pixels, 3, 2, RowOrder::BottomUp).is_err());
    }

    #[test]
    fn rejects_stride_shorter_than_width() {
        let mut pixels = vec![0u32; 16];
        assert!(Surface::new(&mut pixels, 4, 2, 3, RowOrder::BottomUp).is_err());
    }

    #[test]
    fn fill_column_paints_half_open_range() {
        let mut pixels = vec![0u32; 8];
        let mut surface = Surface::packed(&mut pixels, 2, 4, RowOrder::BottomUp).unwrap();
        surface.fill_column(1, 1..3, 5);
        assert_eq!(surface.pixel(1, 0), 0);
        assert_eq!(surface.pixel(1, 1), 5);
        assert_eq!(surface.pixel(1, 2), 5);
        assert_eq!(surface.pixel(1, 3), 0);
    }
}
