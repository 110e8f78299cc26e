use crate::models::error::CaptureError;

/// Byte offsets reported by a capture stream's hardware ring.
///
/// `capture` is where the driver is currently writing; `read` is the end of
/// the region that is already safe to read. Both are byte offsets into the
/// ring, always even (whole 16-bit samples).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub capture: usize,
    pub read: usize,
}

/// A locked, possibly wrapped region of the capture ring.
///
/// Dropping the region unlocks it.
pub trait RegionLock {
    /// The region split at the ring end: the tail of the ring, then the
    /// continuation from offset 0 (empty when the region does not wrap).
    fn parts(&self) -> (&[u8], &[u8]);
}

/// Interface for a single live audio source writing signed 16-bit mono
/// little-endian samples into a fixed-size ring.
///
/// Implemented by:
/// - `spectrum_capture::CpalCaptureStream` (live devices)
/// - `SimulatedCaptureStream` (deterministic in-memory ring)
///
/// The producer keeps writing while the consumer reads; nothing here
/// serializes the two beyond the region lock.
pub trait CaptureStream {
    /// Ring capacity in bytes. Fixed at creation, always even.
    fn buffer_bytes(&self) -> usize;

    /// Current cursor positions. Fails with `PositionUnavailable` when the
    /// device disappeared.
    fn current_position(&self) -> Result<CursorPosition, CaptureError>;

    /// Lock `length` bytes starting at `offset` (mod capacity) for reading.
    /// Fails with `LockFailed`.
    fn lock_region(&self, offset: usize, length: usize) -> Result<Box<dyn RegionLock + '_>, CaptureError>;

    /// Begin capturing into the ring.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop capturing and release the device.
    fn stop(&mut self) -> Result<(), CaptureError>;
}

/// Split a `length`-byte region starting at `offset` in a ring of
/// `capacity` bytes into the lengths of its tail part and its wrapped head
/// part. `None` when the region cannot fit.
pub fn split_region(capacity: usize, offset: usize, length: usize) -> Option<(usize, usize)> {
    if length > capacity || offset >= capacity {
        return None;
    }
    let tail = length.min(capacity - offset);
    Some((tail, length - tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_inside_ring_is_not_split() {
        assert_eq!(split_region(100, 10, 20), Some((20, 0)));
        assert_eq!(split_region(100, 80, 20), Some((20, 0)));
    }

    #[test]
    fn region_past_the_end_wraps() {
        assert_eq!(split_region(100, 90, 20), Some((10, 10)));
        assert_eq!(split_region(100, 98, 100), Some((2, 98)));
    }

    #[test]
    fn oversized_regions_are_rejected() {
        assert_eq!(split_region(100, 0, 101), None);
        assert_eq!(split_region(100, 100, 2), None);
        assert_eq!(split_region(0, 0, 0), None);
    }
}
