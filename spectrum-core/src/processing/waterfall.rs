use super::zeroed;
use crate::models::error::CaptureError;

/// Freshly allocated waterfall storage, installed only once every other
/// resize allocation has succeeded.
#[derive(Debug)]
pub struct WaterfallBuffers {
    width: usize,
    rows: usize,
    image: Vec<u32>,
    row: Vec<u32>,
}

/// Scrolling history of column intensities, one row per frame in which any
/// device produced a new window.
///
/// Each device owns an 8-bit lane of the row color, chosen by device index
/// modulo the lane count. Rows occupy the lower half of the frame.
#[derive(Debug)]
pub struct Waterfall {
    width: usize,
    rows: usize,
    image: Vec<u32>,
    row: Vec<u32>,
    cursor: usize,
    lanes: u32,
    pending: bool,
}

impl Waterfall {
    pub fn new(lanes: u32) -> Self {
        Self {
            width: 0,
            rows: 0,
            image: Vec::new(),
            row: Vec::new(),
            cursor: 0,
            lanes: lanes.clamp(1, 3),
            pending: false,
        }
    }

    /// Storage for a `width` x `frame_height` frame.
    pub fn allocate(width: usize, frame_height: usize) -> Result<WaterfallBuffers, CaptureError> {
        let rows = frame_height / 2;
        Ok(WaterfallBuffers {
            width,
            rows,
            image: zeroed(width * rows)?,
            row: zeroed(width)?,
        })
    }

    /// Replace storage and restart at the bottom row.
    pub fn install(&mut self, buffers: WaterfallBuffers) {
        self.width = buffers.width;
        self.rows = buffers.rows;
        self.image = buffers.image;
        self.row = buffers.row;
        self.cursor = 0;
        self.pending = false;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Next row to be written.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bit offset of the lane used by `device_index`.
    pub fn lane_shift(&self, device_index: usize) -> u32 {
        (device_index as u32 % self.lanes) * 8
    }

    pub fn image_row(&self, row: usize) -> &[u32] {
        &self.image[row * self.width..(row + 1) * self.width]
    }

    /// Start accumulating a new row.
    pub fn begin_row(&mut self) {
        self.row.fill(0);
        self.pending = false;
    }

    /// OR a device's columns into its lane of the pending row.
    pub fn contribute(&mut self, device_index: usize, columns: &[f32]) {
        let shift = self.lane_shift(device_index);
        for (slot, &value) in self.row.iter_mut().zip(columns) {
            let brightness = ((value * 255.0) as u32).min(255);
            *slot |= brightness << shift;
        }
        self.pending = true;
    }

    /// Write the pending row at the cursor and advance. Returns whether a
    /// row was written.
    pub fn commit(&mut self) -> bool {
        if !self.pending || self.rows == 0 {
            return false;
        }
        let start = self.cursor * self.width;
        self.image[start..start + self.width].copy_from_slice(&self.row);
        log::trace!("waterfall row {} committed", self.cursor);
        self.cursor = (self.cursor + 1) % self.rows;
        self.pending = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(lanes: u32, width: usize, frame_height: usize) -> Waterfall {
        let mut waterfall = Waterfall::new(lanes);
        waterfall.install(Waterfall::allocate(width, frame_height).unwrap());
        waterfall
    }

    #[test]
    fn cursor_wraps_at_half_frame_height() {
        let mut waterfall = sized(2, 4, 10);
        assert_eq!(waterfall.rows(), 5);
        for events in 1..=23 {
            waterfall.begin_row();
            waterfall.contribute(0, &[0.5; 4]);
            assert!(waterfall.commit());
            assert_eq!(waterfall.cursor(), events % 5);
        }
    }

    #[test]
    fn row_without_contributions_is_not_committed() {
        let mut waterfall = sized(2, 4, 10);
        waterfall.begin_row();
        assert!(!waterfall.commit());
        assert_eq!(waterfall.cursor(), 0);
    }

    #[test]
    fn devices_fill_separate_lanes() {
        let mut waterfall = sized(2, 3, 4);
        waterfall.begin_row();
        waterfall.contribute(0, &[1.0, 0.5, 0.0]);
        waterfall.contribute(1, &[0.0, 1.0, 2.0]);
        waterfall.commit();
        assert_eq!(waterfall.image_row(0), &[0x0000_00ff, 0x0000_ff7f, 0x0000_ff00]);
    }

    #[test]
    fn lanes_cycle_by_device_index() {
        let waterfall = Waterfall::new(3);
        assert_eq!(waterfall.lane_shift(0), 0);
        assert_eq!(waterfall.lane_shift(2), 16);
        assert_eq!(waterfall.lane_shift(3), 0);

        let single = Waterfall::new(1);
        assert_eq!(single.lane_shift(5), 0);
    }

    #[test]
    fn shared_lane_ors_contributions() {
        let mut waterfall = sized(2, 1, 2);
        waterfall.begin_row();
        waterfall.contribute(0, &[17.0 / 256.0]);
        waterfall.contribute(2, &[2.0 / 256.0]);
        waterfall.commit();
        assert_eq!(waterfall.image_row(0)[0], 0x10 | 0x01);
    }

    #[test]
    fn negative_intensity_is_black() {
        let mut waterfall = sized(2, 1, 2);
        waterfall.begin_row();
        waterfall.contribute(0, &[-3.0]);
        waterfall.commit();
        assert_eq!(waterfall.image_row(0)[0], 0);
    }

    #[test]
    fn install_resets_cursor() {
        let mut waterfall = sized(2, 2, 8);
        waterfall.begin_row();
        waterfall.contribute(0, &[1.0, 1.0]);
        waterfall.commit();
        assert_eq!(waterfall.cursor(), 1);

        waterfall.install(Waterfall::allocate(3, 6).unwrap());
        assert_eq!(waterfall.cursor(), 0);
        assert_eq!(waterfall.rows(), 3);
        assert_eq!(waterfall.image_row(2), &[0, 0, 0]);
    }
}
