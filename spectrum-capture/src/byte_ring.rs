use spectrum_core::traits::capture_stream::{split_region, CursorPosition, RegionLock};
use spectrum_core::CaptureError;

/// Byte ring of little-endian 16-bit samples filled by the driver callback.
///
/// Shared between the callback thread and the pipeline behind
/// `parking_lot::Mutex`. `lost` is raised when the driver reports that the
/// device went away.
#[derive(Debug)]
pub struct ByteRing {
    bytes: Vec<u8>,
    cursor: usize,
    lost: bool,
}

impl ByteRing {
    /// Ring of `capacity` bytes, rounded down to whole samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity & !1],
            cursor: 0,
            lost: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn push(&mut self, sample: i16) {
        if self.bytes.is_empty() {
            return;
        }
        let [lo, hi] = sample.to_le_bytes();
        self.bytes[self.cursor] = lo;
        self.bytes[self.cursor + 1] = hi;
        self.cursor = (self.cursor + 2) % self.bytes.len();
    }

    pub fn mark_lost(&mut self) {
        self.lost = true;
    }

    /// Forget a previous loss, e.g. after the stream was rebuilt.
    pub fn reset_lost(&mut self) {
        self.lost = false;
    }

    /// Everything before the write cursor has been delivered, so both
    /// cursors coincide.
    pub fn position(&self) -> Result<CursorPosition, CaptureError> {
        if self.lost {
            return Err(CaptureError::PositionUnavailable);
        }
        Ok(CursorPosition {
            capture: self.cursor,
            read: self.cursor,
        })
    }

    /// Tail and wrapped head lengths of a region.
    pub fn region_bounds(&self, offset: usize, length: usize) -> Result<(usize, usize), CaptureError> {
        let capacity = self.capacity();
        split_region(capacity, offset, length).ok_or_else(|| {
            CaptureError::LockFailed(format!("region {offset}+{length} outside ring of {capacity} bytes"))
        })
    }

    pub fn parts(&self, offset: usize, tail: usize, head: usize) -> (&[u8], &[u8]) {
        (&self.bytes[offset..offset + tail], &self.bytes[..head])
    }
}

/// A locked region borrowing the ring through any guard type.
pub struct RingRegion<G> {
    pub(crate) guard: G,
    pub(crate) offset: usize,
    pub(crate) tail: usize,
    pub(crate) head: usize,
}

impl<G: std::ops::Deref<Target = ByteRing>> RegionLock for RingRegion<G> {
    fn parts(&self) -> (&[u8], &[u8]) {
        self.guard.parts(self.offset, self.tail, self.head)
    }
}
