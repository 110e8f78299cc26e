use super::compositor::{Compositor, CompositorBuffers, Scene};
use super::control::{ControlAction, ControlState, Key};
use crate::models::audio_models::{CaptureSource, PipelineDiagnostics};
use crate::models::config::VisualizerConfiguration;
use crate::models::device::CaptureDevice;
use crate::models::error::CaptureError;
use crate::models::state::{DeviceTickOutcome, TickReport};
use crate::models::surface::Surface;
use crate::processing::spectrum_engine::SpectrumEngine;
use crate::processing::waterfall::{Waterfall, WaterfallBuffers};
use crate::processing::window_extractor::WindowExtractor;
use crate::processing::zeroed;
use crate::traits::capture_stream::CaptureStream;
use crate::traits::text_renderer::TextRenderer;

/// The whole visualizer: opened devices, processing stages and display
/// state, driven by the host's event loop.
///
/// ```text
/// tick():   [CaptureStream] → WindowExtractor → SpectrumEngine → Waterfall
/// render(): devices + Waterfall + ControlState → Compositor → [Surface]
/// ```
///
/// A tick never fails as a whole: per-device errors are recorded in the
/// returned [`TickReport`] and the device keeps its previous state.
pub struct PipelineState {
    config: VisualizerConfiguration,
    devices: Vec<CaptureDevice>,
    extractor: WindowExtractor,
    engine: SpectrumEngine,
    waterfall: Waterfall,
    compositor: Compositor,
    controls: ControlState,
    pointer: Option<(u32, u32)>,
    width: usize,
    height: usize,
    running: bool,
    diagnostics: PipelineDiagnostics,
}

impl PipelineState {
    /// Validate `config` and wrap each opened stream in a device record.
    /// The pipeline has no frame size until the first [`on_resize`](Self::on_resize).
    pub fn new(
        config: VisualizerConfiguration,
        streams: Vec<(CaptureSource, Box<dyn CaptureStream>)>,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let mut engine = SpectrumEngine::new(&config);
        let devices = streams
            .into_iter()
            .take(config.max_devices)
            .map(|(source, stream)| {
                log::debug!("Adding capture device {}: {}", source.index, source.name);
                CaptureDevice::new(source, stream, engine.create_context())
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Pipeline ready with {} device(s), transform size {}",
            devices.len(),
            config.transform_size
        );

        Ok(Self {
            extractor: WindowExtractor::new(config.transform_size),
            waterfall: Waterfall::new(config.waterfall_lanes),
            compositor: Compositor::new(),
            controls: ControlState::new(&config),
            config,
            devices,
            engine,
            pointer: None,
            width: 0,
            height: 0,
            running: false,
            diagnostics: PipelineDiagnostics::default(),
        })
    }

    /// Start every device. A device that cannot start is fatal.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        for device in &mut self.devices {
            device.start().map_err(|e| {
                CaptureError::DeviceUnavailable(format!("{}: {e}", device.source.name))
            })?;
            log::info!("Capture started: {}", device.source.name);
        }
        self.running = true;
        Ok(())
    }

    /// Stop every device. Failures are logged; shutdown always completes.
    pub fn shutdown(&mut self) {
        for device in &mut self.devices {
            if let Err(e) = device.stop() {
                log::warn!("Failed to stop {}: {e}", device.source.name);
            }
        }
        self.running = false;
        log::info!("Pipeline shut down after {} ticks", self.diagnostics.ticks);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &VisualizerConfiguration {
        &self.config
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn devices(&self) -> &[CaptureDevice] {
        &self.devices
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn topmost(&self) -> usize {
        self.controls.topmost()
    }

    pub fn waterfall(&self) -> &Waterfall {
        &self.waterfall
    }

    pub fn diagnostics(&self) -> PipelineDiagnostics {
        self.diagnostics
    }

    /// Current frame size as last accepted by [`on_resize`](Self::on_resize).
    pub fn frame_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Poll every device once and fold new windows into the spectrum and
    /// waterfall.
    pub fn tick(&mut self) -> TickReport {
        self.diagnostics.ticks += 1;
        self.waterfall.begin_row();

        let mapping = self.engine.mapping(
            self.width,
            self.config.frequency_min,
            self.controls.frequency_ceiling.current(),
        );
        let amplification = self.controls.amplification.current();

        let mut outcomes = Vec::with_capacity(self.devices.len());
        for (index, device) in self.devices.iter_mut().enumerate() {
            let outcome = match self.extractor.poll(device) {
                Ok(false) => DeviceTickOutcome::Unchanged,
                Ok(true) => {
                    device.transform_window();
                    self.engine
                        .update_columns(device.transform.output(), &mapping, amplification, &mut device.spectrum);
                    self.waterfall.contribute(index, &device.spectrum);
                    self.diagnostics.windows_transformed += 1;
                    DeviceTickOutcome::WindowTransformed
                }
                Err(e) => {
                    record_failure(&mut self.diagnostics, index, &device.source.name, &e);
                    DeviceTickOutcome::Skipped(e)
                }
            };
            outcomes.push(outcome);
        }

        let waterfall_advanced = self.waterfall.commit();
        if waterfall_advanced {
            self.diagnostics.waterfall_rows += 1;
        }
        TickReport {
            outcomes,
            waterfall_advanced,
        }
    }

    /// Paint the current state. Does not advance any state, so repeated
    /// calls without an intervening tick or input produce the same pixels.
    pub fn render(&mut self, surface: &mut Surface<'_>, text: &mut dyn TextRenderer) {
        self.diagnostics.renders += 1;
        let scene = Scene {
            devices: &self.devices,
            topmost: self.controls.topmost(),
            colors: &self.config.device_colors,
            sample_clamp: self.controls.sample_clamp.current(),
            frequency_min: self.config.frequency_min,
            frequency_max: self.controls.frequency_ceiling.current(),
            amplification: self.controls.amplification.current(),
            guide_slices: self.config.ring_bytes() / self.config.block_bytes(),
            waterfall: &self.waterfall,
            pointer: self.pointer,
        };
        self.compositor.render(&scene, surface, text);
    }

    /// Reallocate every width-indexed buffer for a `width` x `height` frame.
    ///
    /// All allocations happen before any buffer is replaced; on failure the
    /// previous sizes stay in place and rendering continues truncated.
    pub fn on_resize(&mut self, width: usize, height: usize) -> Result<(), CaptureError> {
        let FrameBuffers {
            spectra,
            scratch,
            waterfall,
        } = match self.allocate_frame(width, height) {
            Ok(buffers) => buffers,
            Err(e) => {
                self.diagnostics.skipped_resizes += 1;
                log::warn!("Skipping resize to {width}x{height}: {e}");
                return Err(e);
            }
        };

        for (device, spectrum) in self.devices.iter_mut().zip(spectra) {
            device.spectrum = spectrum;
        }
        self.compositor.install(scratch);
        self.waterfall.install(waterfall);
        self.width = width;
        self.height = height;
        log::debug!("Resized to {width}x{height}");
        Ok(())
    }

    fn allocate_frame(&self, width: usize, height: usize) -> Result<FrameBuffers, CaptureError> {
        let spectra = self
            .devices
            .iter()
            .map(|_| zeroed(width))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FrameBuffers {
            spectra,
            scratch: Compositor::allocate(width)?,
            waterfall: Waterfall::allocate(width, height)?,
        })
    }

    /// Apply the binding for `key`. Returns whether the key is bound.
    pub fn on_key(&mut self, key: Key) -> bool {
        match ControlAction::from_key(key) {
            Some(action) => {
                self.controls.apply(action, self.devices.len());
                log::debug!("{action:?}: topmost {}", self.controls.topmost());
                true
            }
            None => false,
        }
    }

    /// Pointer position in bottom-up frame coordinates, `None` when it left
    /// the frame.
    pub fn on_pointer(&mut self, position: Option<(u32, u32)>) {
        self.pointer = position;
    }
}

struct FrameBuffers {
    spectra: Vec<Vec<f32>>,
    scratch: CompositorBuffers,
    waterfall: WaterfallBuffers,
}

fn record_failure(diagnostics: &mut PipelineDiagnostics, index: usize, name: &str, error: &CaptureError) {
    match error {
        CaptureError::PositionUnavailable => diagnostics.position_failures += 1,
        CaptureError::LockFailed(_) => diagnostics.lock_failures += 1,
        CaptureError::InvariantViolation(_) => diagnostics.invariant_violations += 1,
        _ => {}
    }
    if error.is_transient() && !matches!(error, CaptureError::InvariantViolation(_)) {
        log::warn!("Device {index} ({name}) skipped this tick: {error}");
    } else {
        log::error!("Device {index} ({name}) aborted this tick: {error}");
    }
}

impl std::fmt::Debug for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineState")
            .field("devices", &self.devices)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("controls", &self.controls)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
