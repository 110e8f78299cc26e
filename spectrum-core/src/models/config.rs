use serde::{Deserialize, Serialize};

use super::config_value::ConfigValue;

/// Palette cycled by device index: blue, green, red (`0x00RRGGBB`).
pub const DEFAULT_DEVICE_COLORS: [u32; 3] = [0x0000_00ff, 0x0000_ff00, 0x00ff_0000];

/// Highest frequency distinguishable by a transform of `transform_size`
/// buckets at `sample_rate`.
pub fn computed_max_frequency(sample_rate: u32, transform_size: usize) -> f32 {
    let size = transform_size as f32;
    ((size - 1.0) / size * sample_rate as f32) / 2.0
}

/// Configuration for the visualizer pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerConfiguration {
    /// Capture sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Length of each device's capture ring in seconds (default: 5).
    pub buffered_seconds: u32,

    /// Samples per transform window (default: sample_rate / 4).
    pub transform_size: usize,

    /// Upper bound on simultaneously opened devices (default: 8).
    pub max_devices: usize,

    /// Per-window decay applied to displayed column values (default: 0.95).
    pub fade_factor: f32,

    /// Lowest visible frequency in Hz (default: 0).
    pub frequency_min: f32,

    /// Smallest allowed visible frequency ceiling in Hz (default: 100).
    pub frequency_floor: f32,

    /// Spectrum amplification factor.
    pub amplification: ConfigValue,

    /// Absolute sample value mapped to full oscilloscope height.
    pub sample_clamp: ConfigValue,

    /// Device colors, cycled by device index.
    pub device_colors: Vec<u32>,

    /// Number of 8-bit color lanes shared by devices in the waterfall (1..=3).
    pub waterfall_lanes: u32,
}

impl VisualizerConfiguration {
    /// Bytes held by each device's capture ring (mono, 16-bit).
    pub fn ring_bytes(&self) -> usize {
        self.sample_rate as usize * self.buffered_seconds as usize * 2
    }

    /// Bytes consumed by one transform window.
    pub fn block_bytes(&self) -> usize {
        self.transform_size * 2
    }

    pub fn computed_max_frequency(&self) -> f32 {
        computed_max_frequency(self.sample_rate, self.transform_size)
    }

    /// The adjustable visible-frequency ceiling, starting fully open.
    pub fn frequency_ceiling(&self) -> ConfigValue {
        let max = self.computed_max_frequency();
        ConfigValue::new(self.frequency_floor.min(max), max, max)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.buffered_seconds == 0 {
            return Err("buffered seconds must be positive".into());
        }
        if self.transform_size < 2 {
            return Err(format!("transform size {} is too small", self.transform_size));
        }
        if self.block_bytes() > self.ring_bytes() {
            return Err(format!(
                "transform size {} exceeds ring capacity of {} samples",
                self.transform_size,
                self.ring_bytes() / 2
            ));
        }
        if !(0.0..1.0).contains(&self.fade_factor) {
            return Err(format!("fade factor {} outside [0, 1)", self.fade_factor));
        }
        if self.device_colors.is_empty() {
            return Err("device color palette is empty".into());
        }
        if !(1..=3).contains(&self.waterfall_lanes) {
            return Err(format!("unsupported waterfall lane count: {}", self.waterfall_lanes));
        }
        if self.frequency_min < 0.0 || self.frequency_min >= self.computed_max_frequency() {
            return Err(format!(
                "frequency minimum {} outside [0, {})",
                self.frequency_min,
                self.computed_max_frequency()
            ));
        }
        for (name, value) in [("amplification", self.amplification), ("sample clamp", self.sample_clamp)] {
            if value.min() <= 0.0 {
                return Err(format!("{name} minimum must be positive"));
            }
        }
        Ok(())
    }
}

impl Default for VisualizerConfiguration {
    fn default() -> Self {
        let sample_rate = 44_100;
        Self {
            sample_rate,
            buffered_seconds: 5,
            transform_size: sample_rate as usize / 4,
            max_devices: 8,
            fade_factor: 0.95,
            frequency_min: 0.0,
            frequency_floor: 100.0,
            amplification: ConfigValue::new(0.0001, 1.0, 100.0),
            sample_clamp: ConfigValue::new(1.0, 32_767.0, 32_767.0),
            device_colors: DEFAULT_DEVICE_COLORS.to_vec(),
            waterfall_lanes: 2,
        }
    }
}
