//! # spectrum-core
//!
//! Platform-agnostic core of a real-time, multi-device audio spectrum
//! visualizer.
//!
//! Each capture device writes 16-bit mono samples into a ring. Every tick
//! the pipeline copies the newest complete window from each ring, runs a
//! forward FFT, maps the buckets onto screen columns with fade, and scrolls
//! the result into a shared waterfall. Rendering composites all devices
//! into one frame. Capture backends implement the `CaptureStream` trait and
//! plug into `PipelineState`.
//!
//! ## Architecture
//!
//! ```text
//! spectrum-core (this crate)
//! ├── traits/       ← CaptureStream, RegionLock, TextRenderer
//! ├── models/       ← CaptureError, VisualizerConfiguration, ConfigValue, Surface, CaptureDevice
//! ├── processing/   ← WindowExtractor, SpectrumEngine, Waterfall, SimulatedCaptureStream
//! └── session/      ← PipelineState, Compositor, ControlState
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{CaptureSource, PipelineDiagnostics};
pub use models::config::{VisualizerConfiguration, DEFAULT_DEVICE_COLORS};
pub use models::config_value::ConfigValue;
pub use models::device::CaptureDevice;
pub use models::error::CaptureError;
pub use models::state::{DeviceTickOutcome, TickReport};
pub use models::surface::{RowOrder, Surface};
pub use processing::simulated_stream::SimulatedCaptureStream;
pub use processing::spectrum_engine::{BucketRange, ColumnMapping, SpectrumEngine, TransformContext};
pub use processing::waterfall::Waterfall;
pub use processing::window_extractor::WindowExtractor;
pub use session::compositor::Compositor;
pub use session::control::{ControlAction, ControlState, Key};
pub use session::pipeline::PipelineState;
pub use traits::capture_stream::{split_region, CaptureStream, CursorPosition, RegionLock};
pub use traits::text_renderer::{NoText, TextOverlay, TextRenderer};
