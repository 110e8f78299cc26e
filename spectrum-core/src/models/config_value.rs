use serde::{Deserialize, Serialize};

/// A user-adjustable scalar bounded by `[min, max]`.
///
/// Only moved in powers of two: `double` and `halve` clamp the result back
/// into range, so `min <= current <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigValue {
    min: f32,
    current: f32,
    max: f32,
}

impl ConfigValue {
    /// Build a bounded value. `current` is clamped into range and the bounds
    /// are swapped if given in the wrong order.
    pub fn new(min: f32, current: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            current: current.clamp(min, max),
            max,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Double the current value, saturating at `max`.
    pub fn double(&mut self) -> f32 {
        self.current = (self.current * 2.0).min(self.max);
        self.current
    }

    /// Halve the current value, saturating at `min`.
    pub fn halve(&mut self) -> f32 {
        self.current = (self.current / 2.0).max(self.min);
        self.current
    }
}
