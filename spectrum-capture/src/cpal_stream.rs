//! Live input device exposed as a [`CaptureStream`].
//!
//! The driver callback converts every frame's first channel to `i16` and
//! appends it to a shared [`ByteRing`]; the pipeline polls the ring's write
//! cursor and copies windows out under the same lock.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, StreamConfig};
use parking_lot::Mutex;

use spectrum_core::traits::capture_stream::{CaptureStream, CursorPosition, RegionLock};
use spectrum_core::CaptureError;

use crate::byte_ring::{ByteRing, RingRegion};

/// Capture from one cpal input device into a fixed-size ring.
pub struct CpalCaptureStream {
    device: cpal::Device,
    name: String,
    config: StreamConfig,
    sample_format: SampleFormat,
    ring: Arc<Mutex<ByteRing>>,
    capacity: usize,
    stream: Option<cpal::Stream>,
}

impl CpalCaptureStream {
    /// Prepare capture with a ring of `ring_bytes` bytes. Nothing is
    /// recorded until [`CaptureStream::start`].
    pub fn new(
        device: cpal::Device,
        name: String,
        config: StreamConfig,
        sample_format: SampleFormat,
        ring_bytes: usize,
    ) -> Self {
        let ring = ByteRing::new(ring_bytes);
        let capacity = ring.capacity();
        Self {
            device,
            name,
            config,
            sample_format,
            ring: Arc::new(Mutex::new(ring)),
            capacity,
            stream: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    fn build_stream(&self) -> Result<cpal::Stream, CaptureError> {
        let built = match self.sample_format {
            SampleFormat::I8 => self.build_typed_stream::<i8>(),
            SampleFormat::I16 => self.build_typed_stream::<i16>(),
            SampleFormat::I32 => self.build_typed_stream::<i32>(),
            SampleFormat::U8 => self.build_typed_stream::<u8>(),
            SampleFormat::U16 => self.build_typed_stream::<u16>(),
            SampleFormat::U32 => self.build_typed_stream::<u32>(),
            SampleFormat::F32 => self.build_typed_stream::<f32>(),
            SampleFormat::F64 => self.build_typed_stream::<f64>(),
            other => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "{}: unsupported sample format {other:?}",
                    self.name
                )))
            }
        };
        built.map_err(|e| CaptureError::DeviceUnavailable(format!("{}: {e}", self.name)))
    }

    fn build_typed_stream<T>(&self) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: SizedSample + Send + 'static,
        i16: FromSample<T>,
    {
        let ring = Arc::clone(&self.ring);
        let error_ring = Arc::clone(&self.ring);
        let channels = usize::from(self.config.channels.max(1));
        let name = self.name.clone();

        self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut ring = ring.lock();
                for frame in data.chunks(channels) {
                    let sample: i16 = cpal::Sample::from_sample(frame[0]);
                    ring.push(sample);
                }
            },
            move |err| {
                log::error!("Capture stream error on {name}: {err}");
                if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                    error_ring.lock().mark_lost();
                }
            },
            None,
        )
    }
}

impl CaptureStream for CpalCaptureStream {
    fn buffer_bytes(&self) -> usize {
        self.capacity
    }

    fn current_position(&self) -> Result<CursorPosition, CaptureError> {
        self.ring.lock().position()
    }

    fn lock_region(&self, offset: usize, length: usize) -> Result<Box<dyn RegionLock + '_>, CaptureError> {
        let guard = self.ring.lock();
        let (tail, head) = guard.region_bounds(offset, length)?;
        Ok(Box::new(RingRegion {
            guard,
            offset,
            tail,
            head,
        }))
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.is_running() {
            return Ok(());
        }
        let stream = self.build_stream()?;
        stream
            .play()
            .map_err(|e| CaptureError::DeviceUnavailable(format!("{}: {e}", self.name)))?;
        self.ring.lock().reset_lost();
        log::info!(
            "Capturing {} ({} ch @ {} Hz, {:?})",
            self.name(),
            self.config.channels,
            self.config.sample_rate.0,
            self.sample_format
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        stream
            .pause()
            .map_err(|e| CaptureError::DeviceUnavailable(format!("{}: {e}", self.name)))?;
        log::info!("Stopped capturing {}", self.name());
        Ok(())
    }
}
