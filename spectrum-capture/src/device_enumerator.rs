//! Input device enumeration through the platform's default cpal host.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{SampleFormat, SampleRate, SupportedStreamConfigRange};

use spectrum_core::traits::capture_stream::CaptureStream;
use spectrum_core::{CaptureError, CaptureSource, VisualizerConfiguration};

use crate::cpal_stream::CpalCaptureStream;

/// An input device as seen during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceInfo {
    pub name: String,
    pub is_default: bool,
    /// Whether the device can capture at the requested sample rate.
    pub supports_rate: bool,
}

/// Audio device enumerator over the default cpal host.
pub struct DeviceEnumerator {
    host: cpal::Host,
}

impl DeviceEnumerator {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List input devices in host order.
    pub fn list_capture_devices(&self, sample_rate: u32) -> Result<Vec<InputDeviceInfo>, CaptureError> {
        let default_name = self.default_device_name();
        let devices = self
            .host
            .input_devices()
            .map_err(|e| CaptureError::DeviceUnavailable(format!("failed to enumerate input devices: {e}")))?;

        Ok(devices
            .map(|device| {
                let name = device.name().unwrap_or_else(|_| "Unknown Device".to_string());
                InputDeviceInfo {
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    supports_rate: select_config(&device, sample_rate).is_some(),
                    name,
                }
            })
            .collect())
    }

    /// Open the first `config.max_devices` input devices that support the
    /// configured sample rate. Returns an empty list when none do.
    pub fn open_capture_devices(
        &self,
        config: &VisualizerConfiguration,
    ) -> Result<Vec<(CaptureSource, Box<dyn CaptureStream>)>, CaptureError> {
        let default_name = self.default_device_name();
        let devices = self
            .host
            .input_devices()
            .map_err(|e| CaptureError::DeviceUnavailable(format!("failed to enumerate input devices: {e}")))?;

        let mut opened: Vec<(CaptureSource, Box<dyn CaptureStream>)> = Vec::new();
        for device in devices {
            if opened.len() >= config.max_devices {
                break;
            }
            let name = device.name().unwrap_or_else(|_| "Unknown Device".to_string());
            let Some(range) = select_config(&device, config.sample_rate) else {
                log::debug!("Skipping {name}: no input format at {} Hz", config.sample_rate);
                continue;
            };

            let supported = range.with_sample_rate(SampleRate(config.sample_rate));
            let sample_format = supported.sample_format();
            let stream_config = supported.config();
            log::info!(
                "Opening input device {}: {name} ({} ch, {:?})",
                opened.len(),
                stream_config.channels,
                sample_format
            );

            let source = CaptureSource {
                index: opened.len(),
                is_default: default_name.as_deref() == Some(name.as_str()),
                sample_rate: config.sample_rate,
                name: name.clone(),
            };
            let stream = CpalCaptureStream::new(device, name, stream_config, sample_format, config.ring_bytes());
            opened.push((source, Box::new(stream)));
        }

        if opened.is_empty() {
            log::warn!("No input device supports {} Hz", config.sample_rate);
        }
        Ok(opened)
    }

    fn default_device_name(&self) -> Option<String> {
        self.host.default_input_device().and_then(|d| d.name().ok())
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the input format range covering `sample_rate`, preferring formats
/// that need no conversion.
fn select_config(device: &cpal::Device, sample_rate: u32) -> Option<SupportedStreamConfigRange> {
    let ranges: Vec<_> = device.supported_input_configs().ok()?.collect();
    let candidates: Vec<_> = ranges
        .into_iter()
        .filter(|range| supports_rate(range.min_sample_rate().0, range.max_sample_rate().0, sample_rate))
        .collect();
    let rank = |range: &SupportedStreamConfigRange| format_rank(range.sample_format());
    candidates.into_iter().min_by_key(|range| (rank(range), range.channels()))
}

fn supports_rate(min: u32, max: u32, sample_rate: u32) -> bool {
    min <= sample_rate && sample_rate <= max
}

fn format_rank(format: SampleFormat) -> u8 {
    match format {
        SampleFormat::I16 => 0,
        SampleFormat::F32 => 1,
        SampleFormat::I32 | SampleFormat::F64 => 2,
        _ => 3,
    }
}
