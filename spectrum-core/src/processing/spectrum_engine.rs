use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::models::config::VisualizerConfiguration;

/// Per-device transform buffers sharing one cached forward plan.
///
/// The input buffer doubles as transform scratch, so it is rewritten from
/// the window before every run.
pub struct TransformContext {
    plan: Arc<dyn Fft<f32>>,
    input: Vec<Complex<f32>>,
    output: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl TransformContext {
    pub fn new(plan: Arc<dyn Fft<f32>>) -> Self {
        let size = plan.len();
        let scratch_len = plan.get_outofplace_scratch_len();
        Self {
            plan,
            input: vec![Complex::new(0.0, 0.0); size],
            output: vec![Complex::new(0.0, 0.0); size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    pub fn size(&self) -> usize {
        self.input.len()
    }

    /// Forward transform of `window`. Missing samples are treated as silence.
    pub fn transform(&mut self, window: &[i16]) {
        let filled = window.len().min(self.input.len());
        for (slot, &sample) in self.input.iter_mut().zip(&window[..filled]) {
            *slot = Complex::new(sample as f32, 0.0);
        }
        for slot in &mut self.input[filled..] {
            *slot = Complex::new(0.0, 0.0);
        }
        self.plan
            .process_outofplace_with_scratch(&mut self.input, &mut self.output, &mut self.scratch);
    }

    /// Complex spectrum of the last transformed window.
    pub fn output(&self) -> &[Complex<f32>] {
        &self.output
    }
}

impl std::fmt::Debug for TransformContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformContext").field("size", &self.size()).finish()
    }
}

/// Half-open range of frequency buckets summed into one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRange {
    pub first: usize,
    pub last: usize,
}

impl BucketRange {
    pub fn len(&self) -> usize {
        self.last - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.last <= self.first
    }
}

/// Maps screen columns onto the visible slice of the usable buckets.
///
/// Column `x` starts at `base + x * bucket_width`, truncated; the last column
/// ends exactly at the bucket of the frequency ceiling. Every range holds at
/// least one bucket and none reaches past the usable half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMapping {
    base: f64,
    bucket_width: f64,
    end: usize,
    usable_buckets: usize,
    columns: usize,
}

impl ColumnMapping {
    pub fn new(
        columns: usize,
        frequency_min: f32,
        frequency_max: f32,
        max_frequency: f32,
        usable_buckets: usize,
    ) -> Self {
        let max_frequency = f64::from(max_frequency);
        let span = f64::from((frequency_max - frequency_min).max(0.0));
        let buckets = usable_buckets as f64;
        let base = buckets * f64::from(frequency_min.max(0.0)) / max_frequency;
        let span_buckets = buckets * span / max_frequency;
        let usable_buckets = usable_buckets.max(1);
        Self {
            base,
            bucket_width: span_buckets / columns.max(1) as f64,
            end: ((base + span_buckets) as usize).min(usable_buckets),
            usable_buckets,
            columns,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Fractional number of buckets per column.
    pub fn bucket_width(&self) -> f32 {
        self.bucket_width as f32
    }

    pub fn range(&self, column: usize) -> BucketRange {
        let usable = self.usable_buckets;
        let first = (self.edge(column) as usize).min(usable - 1);
        let mut last = if column + 1 >= self.columns {
            self.end
        } else {
            (self.edge(column + 1) as usize).min(usable)
        };
        if last <= first {
            last = first + 1;
        }
        BucketRange { first, last }
    }

    fn edge(&self, column: usize) -> f64 {
        self.base + self.bucket_width * column as f64
    }

    pub fn ranges(&self) -> impl Iterator<Item = BucketRange> + '_ {
        (0..self.columns).map(|column| self.range(column))
    }
}

/// Turns transformed windows into per-column intensities.
pub struct SpectrumEngine {
    planner: FftPlanner<f32>,
    transform_size: usize,
    max_frequency: f32,
    fade_factor: f32,
}

impl SpectrumEngine {
    pub fn new(config: &VisualizerConfiguration) -> Self {
        Self {
            planner: FftPlanner::new(),
            transform_size: config.transform_size,
            max_frequency: config.computed_max_frequency(),
            fade_factor: config.fade_factor,
        }
    }

    /// Buffers for one device. Plans are cached, so every context shares
    /// the same twiddle tables.
    pub fn create_context(&mut self) -> TransformContext {
        TransformContext::new(self.planner.plan_fft_forward(self.transform_size))
    }

    pub fn transform_size(&self) -> usize {
        self.transform_size
    }

    /// Buckets below the Nyquist mirror.
    pub fn usable_buckets(&self) -> usize {
        self.transform_size / 2
    }

    pub fn max_frequency(&self) -> f32 {
        self.max_frequency
    }

    pub fn mapping(&self, columns: usize, frequency_min: f32, frequency_max: f32) -> ColumnMapping {
        ColumnMapping::new(
            columns,
            frequency_min,
            frequency_max,
            self.max_frequency,
            self.usable_buckets(),
        )
    }

    /// Fold a transformed window into the displayed columns.
    ///
    /// Each column takes the mean magnitude of its buckets, scaled by the
    /// transform size and `amplification`, or its previous value decayed by
    /// the fade factor, whichever is larger.
    pub fn update_columns(
        &self,
        spectrum: &[Complex<f32>],
        mapping: &ColumnMapping,
        amplification: f32,
        columns: &mut [f32],
    ) {
        let normalization = (self.transform_size as f32 * mapping.bucket_width()).max(1.0);
        for (column, value) in columns.iter_mut().enumerate() {
            let range = mapping.range(column);
            let last = range.last.min(spectrum.len());
            let first = range.first.min(last);
            let sum: f32 = spectrum[first..last].iter().map(|bucket| bucket.norm()).sum();
            let fresh = sum / normalization * amplification;
            *value = fresh.max(*value * self.fade_factor);
        }
    }
}
