use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::models::error::CaptureError;
use crate::traits::capture_stream::{split_region, CaptureStream, CursorPosition, RegionLock};

#[derive(Debug)]
struct SimulatedRing {
    bytes: Vec<u8>,
    cursor: usize,
    running: bool,
    fail_position: bool,
    fail_lock: bool,
    short_read_by: usize,
    locks: Cell<usize>,
    last_split: Cell<(usize, usize)>,
}

/// Deterministic in-memory capture ring.
///
/// Samples are written by the test (or a synthetic source) instead of a
/// driver. Clones share the same ring, so one handle can be boxed into a
/// pipeline while another keeps producing samples and injecting failures.
#[derive(Debug, Clone)]
pub struct SimulatedCaptureStream {
    ring: Rc<RefCell<SimulatedRing>>,
}

impl SimulatedCaptureStream {
    /// Ring of `buffer_bytes` bytes (rounded down to whole samples).
    pub fn new(buffer_bytes: usize) -> Self {
        Self {
            ring: Rc::new(RefCell::new(SimulatedRing {
                bytes: vec![0; buffer_bytes & !1],
                cursor: 0,
                running: false,
                fail_position: false,
                fail_lock: false,
                short_read_by: 0,
                locks: Cell::new(0),
                last_split: Cell::new((0, 0)),
            })),
        }
    }

    /// Ring sized for `seconds` of mono 16-bit audio at `sample_rate`.
    pub fn with_duration(sample_rate: u32, seconds: u32) -> Self {
        Self::new(sample_rate as usize * seconds as usize * 2)
    }

    /// Append samples at the cursor, wrapping at the ring end.
    pub fn write_samples(&self, samples: &[i16]) {
        let mut ring = self.ring.borrow_mut();
        let capacity = ring.bytes.len();
        if capacity == 0 {
            return;
        }
        for sample in samples {
            let [lo, hi] = sample.to_le_bytes();
            let cursor = ring.cursor;
            ring.bytes[cursor] = lo;
            ring.bytes[cursor + 1] = hi;
            ring.cursor = (cursor + 2) % capacity;
        }
    }

    /// Move the cursor without writing (rounded down to a whole sample).
    pub fn set_cursor(&self, byte_offset: usize) {
        let mut ring = self.ring.borrow_mut();
        let capacity = ring.bytes.len().max(1);
        ring.cursor = (byte_offset & !1) % capacity;
    }

    pub fn cursor(&self) -> usize {
        self.ring.borrow().cursor
    }

    pub fn set_position_failure(&self, fail: bool) {
        self.ring.borrow_mut().fail_position = fail;
    }

    pub fn set_lock_failure(&self, fail: bool) {
        self.ring.borrow_mut().fail_lock = fail;
    }

    /// Make every locked region report `bytes` fewer bytes than requested.
    pub fn set_short_reads(&self, bytes: usize) {
        self.ring.borrow_mut().short_read_by = bytes;
    }

    pub fn is_running(&self) -> bool {
        self.ring.borrow().running
    }

    /// Number of successful `lock_region` calls.
    pub fn lock_count(&self) -> usize {
        self.ring.borrow().locks.get()
    }

    /// Lengths of the two parts handed out by the last lock.
    pub fn last_split(&self) -> (usize, usize) {
        self.ring.borrow().last_split.get()
    }
}

struct SimulatedRegion<'a> {
    ring: Ref<'a, SimulatedRing>,
    offset: usize,
    first_len: usize,
    second_len: usize,
}

impl RegionLock for SimulatedRegion<'_> {
    fn parts(&self) -> (&[u8], &[u8]) {
        let bytes = &self.ring.bytes;
        (
            &bytes[self.offset..self.offset + self.first_len],
            &bytes[..self.second_len],
        )
    }
}

impl CaptureStream for SimulatedCaptureStream {
    fn buffer_bytes(&self) -> usize {
        self.ring.borrow().bytes.len()
    }

    fn current_position(&self) -> Result<CursorPosition, CaptureError> {
        let ring = self.ring.borrow();
        if ring.fail_position {
            return Err(CaptureError::PositionUnavailable);
        }
        Ok(CursorPosition {
            capture: ring.cursor,
            read: ring.cursor,
        })
    }

    fn lock_region(&self, offset: usize, length: usize) -> Result<Box<dyn RegionLock + '_>, CaptureError> {
        let ring = self.ring.borrow();
        let capacity = ring.bytes.len();
        if ring.fail_lock {
            return Err(CaptureError::LockFailed("simulated lock failure".into()));
        }
        let Some((tail, head)) = split_region(capacity, offset, length) else {
            return Err(CaptureError::LockFailed(format!(
                "region {offset}+{length} outside ring of {capacity} bytes"
            )));
        };
        let (first_len, second_len) = if head == 0 {
            (tail.saturating_sub(ring.short_read_by), 0)
        } else {
            (tail, head.saturating_sub(ring.short_read_by))
        };

        ring.locks.set(ring.locks.get() + 1);
        ring.last_split.set((first_len, second_len));
        Ok(Box::new(SimulatedRegion {
            ring,
            offset,
            first_len,
            second_len,
        }))
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        self.ring.borrow_mut().running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.ring.borrow_mut().running = false;
        Ok(())
    }
}
