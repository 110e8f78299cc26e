use super::audio_models::CaptureSource;
use super::error::CaptureError;
use crate::processing::spectrum_engine::TransformContext;
use crate::traits::capture_stream::CaptureStream;

/// One opened capture source and everything derived from it.
///
/// `samples` mirrors the stream's ring in sample units and is only written
/// where a window was copied. `spectrum` holds one intensity per screen
/// column and is resized with the frame.
pub struct CaptureDevice {
    pub(crate) source: CaptureSource,
    pub(crate) stream: Box<dyn CaptureStream>,
    pub(crate) buffer_bytes: usize,
    pub(crate) samples: Vec<i16>,
    pub(crate) window: Vec<i16>,
    pub(crate) spectrum: Vec<f32>,
    pub(crate) transform: TransformContext,
    pub(crate) last_aligned: Option<usize>,
    pub(crate) read_progress: usize,
}

impl CaptureDevice {
    pub fn new(
        source: CaptureSource,
        stream: Box<dyn CaptureStream>,
        transform: TransformContext,
    ) -> Result<Self, CaptureError> {
        let buffer_bytes = stream.buffer_bytes();
        let block_bytes = transform.size() * 2;
        if buffer_bytes % 2 != 0 || buffer_bytes < block_bytes {
            return Err(CaptureError::DeviceUnavailable(format!(
                "{}: ring of {buffer_bytes} bytes cannot hold a {block_bytes}-byte window",
                source.name
            )));
        }
        Ok(Self {
            source,
            stream,
            buffer_bytes,
            samples: vec![0; buffer_bytes / 2],
            window: vec![0; transform.size()],
            spectrum: Vec::new(),
            transform,
            last_aligned: None,
            read_progress: 0,
        })
    }

    pub fn source(&self) -> &CaptureSource {
        &self.source
    }

    pub fn buffer_bytes(&self) -> usize {
        self.buffer_bytes
    }

    /// Mirror of the capture ring, in samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// The most recently copied window, oldest sample first.
    pub fn window(&self) -> &[i16] {
        &self.window
    }

    /// Displayed intensity per column.
    pub fn spectrum(&self) -> &[f32] {
        &self.spectrum
    }

    /// Aligned read cursor of the last processed window.
    pub fn last_aligned(&self) -> Option<usize> {
        self.last_aligned
    }

    /// Raw read cursor observed on the last successful poll.
    pub fn read_progress(&self) -> usize {
        self.read_progress
    }

    pub(crate) fn transform_window(&mut self) {
        self.transform.transform(&self.window);
    }

    pub(crate) fn start(&mut self) -> Result<(), CaptureError> {
        self.stream.start()
    }

    pub(crate) fn stop(&mut self) -> Result<(), CaptureError> {
        self.stream.stop()
    }
}

impl std::fmt::Debug for CaptureDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureDevice")
            .field("source", &self.source)
            .field("buffer_bytes", &self.buffer_bytes)
            .field("last_aligned", &self.last_aligned)
            .field("read_progress", &self.read_progress)
            .finish()
    }
}
