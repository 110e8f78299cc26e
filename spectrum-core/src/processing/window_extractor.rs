use crate::models::device::CaptureDevice;
use crate::models::error::CaptureError;

/// Detects when a device's read cursor crosses into a new window-sized
/// block and copies the block that just completed.
#[derive(Debug, Clone, Copy)]
pub struct WindowExtractor {
    block_bytes: usize,
}

impl WindowExtractor {
    pub fn new(transform_size: usize) -> Self {
        Self {
            block_bytes: transform_size * 2,
        }
    }

    pub fn block_bytes(&self) -> usize {
        self.block_bytes
    }

    /// Largest multiple of the block size not above `cursor`.
    pub fn align(&self, cursor: usize) -> usize {
        match self.block_bytes {
            0 => cursor,
            block => cursor / block * block,
        }
    }

    /// Poll `device` once.
    ///
    /// Returns `Ok(true)` when a new window was copied into the device's
    /// working window and sample mirror, `Ok(false)` when the aligned cursor
    /// has not moved. On error nothing but the observed read progress
    /// changes, so the same block is retried on the next poll.
    ///
    /// The sample mirror receives the window at the block's own ring
    /// position, `aligned - block`, not at the read cursor.
    pub fn poll(&self, device: &mut CaptureDevice) -> Result<bool, CaptureError> {
        let capacity = device.buffer_bytes;
        let position = device.stream.current_position()?;
        if position.read % 2 != 0 || position.read >= capacity {
            return Err(CaptureError::InvariantViolation(format!(
                "{}: read cursor {} invalid for ring of {capacity} bytes",
                device.source.name, position.read
            )));
        }
        device.read_progress = position.read;

        let aligned = self.align(position.read);
        if device.last_aligned == Some(aligned) {
            return Ok(false);
        }

        // The block that just completed ends at the aligned cursor.
        let start = (aligned + capacity - self.block_bytes) % capacity;
        {
            let region = device.stream.lock_region(start, self.block_bytes)?;
            let (first, second) = region.parts();
            if first.len() + second.len() != self.block_bytes {
                return Err(CaptureError::InvariantViolation(format!(
                    "{}: locked {} + {} bytes, expected {}",
                    device.source.name,
                    first.len(),
                    second.len(),
                    self.block_bytes
                )));
            }
            decode_samples(first, second, &mut device.window);
        }

        let ring_samples = device.samples.len();
        let first_sample = start / 2;
        for (i, &sample) in device.window.iter().enumerate() {
            device.samples[(first_sample + i) % ring_samples] = sample;
        }

        log::trace!(
            "{}: window at byte {start}, aligned cursor {aligned}, capture cursor {}",
            device.source.name,
            position.capture
        );
        device.last_aligned = Some(aligned);
        Ok(true)
    }
}

/// Little-endian 16-bit samples from a possibly split region.
fn decode_samples(first: &[u8], second: &[u8], out: &mut [i16]) {
    let mut bytes = first.iter().chain(second).copied();
    for slot in out.iter_mut() {
        match (bytes.next(), bytes.next()) {
            (Some(lo), Some(hi)) => *slot = i16::from_le_bytes([lo, hi]),
            _ => break,
        }
    }
}
