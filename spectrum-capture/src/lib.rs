//! # spectrum-capture
//!
//! Live capture backend for spectrum-core, built on cpal.
//!
//! Provides:
//! - `DeviceEnumerator`: input device listing and opening via the default host
//! - `CpalCaptureStream`: one input device recording into a byte ring, implementing `CaptureStream`
//!
//! ## Usage
//! ```ignore
//! use spectrum_capture::DeviceEnumerator;
//! use spectrum_core::{PipelineState, VisualizerConfiguration};
//!
//! let config = VisualizerConfiguration::default();
//! let streams = DeviceEnumerator::new().open_capture_devices(&config)?;
//! let mut pipeline = PipelineState::new(config, streams)?;
//! pipeline.start()?;
//! ```

pub mod byte_ring;
pub mod cpal_stream;
pub mod device_enumerator;

pub use cpal_stream::CpalCaptureStream;
pub use device_enumerator::{DeviceEnumerator, InputDeviceInfo};
