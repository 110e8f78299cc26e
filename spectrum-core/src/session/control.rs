use crate::models::config::VisualizerConfiguration;
use crate::models::config_value::ConfigValue;

/// Keys the visualizer reacts to, independent of the windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Character(char),
}

/// A single discrete adjustment. Every key press applies exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    RaiseSampleClamp,
    LowerSampleClamp,
    RotateLeft,
    RotateRight,
    NarrowFrequency,
    WidenFrequency,
    LowerAmplification,
    RaiseAmplification,
}

impl ControlAction {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Down => Some(Self::RaiseSampleClamp),
            Key::Up => Some(Self::LowerSampleClamp),
            Key::Left => Some(Self::RotateLeft),
            Key::Right => Some(Self::RotateRight),
            Key::Character(c) => match c.to_ascii_lowercase() {
                'n' => Some(Self::NarrowFrequency),
                'm' => Some(Self::WidenFrequency),
                ',' => Some(Self::LowerAmplification),
                '.' => Some(Self::RaiseAmplification),
                _ => None,
            },
        }
    }
}

/// User-adjustable display state.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub amplification: ConfigValue,
    pub sample_clamp: ConfigValue,
    pub frequency_ceiling: ConfigValue,
    topmost: usize,
}

impl ControlState {
    pub fn new(config: &VisualizerConfiguration) -> Self {
        Self {
            amplification: config.amplification,
            sample_clamp: config.sample_clamp,
            frequency_ceiling: config.frequency_ceiling(),
            topmost: 0,
        }
    }

    /// Index of the device drawn first.
    pub fn topmost(&self) -> usize {
        self.topmost
    }

    pub fn apply(&mut self, action: ControlAction, device_count: usize) {
        match action {
            ControlAction::RaiseSampleClamp => {
                self.sample_clamp.double();
            }
            ControlAction::LowerSampleClamp => {
                self.sample_clamp.halve();
            }
            ControlAction::RotateLeft => self.rotate_left(device_count),
            ControlAction::RotateRight => self.rotate_right(device_count),
            ControlAction::NarrowFrequency => {
                self.frequency_ceiling.halve();
            }
            ControlAction::WidenFrequency => {
                self.frequency_ceiling.double();
            }
            ControlAction::LowerAmplification => {
                self.amplification.halve();
            }
            ControlAction::RaiseAmplification => {
                self.amplification.double();
            }
        }
    }

    fn rotate_left(&mut self, device_count: usize) {
        if device_count == 0 {
            return;
        }
        self.topmost = (self.topmost % device_count + device_count - 1) % device_count;
    }

    fn rotate_right(&mut self, device_count: usize) {
        if device_count == 0 {
            return;
        }
        self.topmost = (self.topmost + 1) % device_count;
    }
}

/// Device indices in draw order, starting at `topmost` and wrapping.
pub fn draw_order(device_count: usize, topmost: usize) -> impl Iterator<Item = usize> {
    (0..device_count).map(move |i| (i + topmost) % device_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state() -> ControlState {
        ControlState::new(&VisualizerConfiguration::default())
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(ControlAction::from_key(Key::Down), Some(ControlAction::RaiseSampleClamp));
        assert_eq!(ControlAction::from_key(Key::Up), Some(ControlAction::LowerSampleClamp));
        assert_eq!(ControlAction::from_key(Key::Character('M')), Some(ControlAction::WidenFrequency));
        assert_eq!(ControlAction::from_key(Key::Character(',')), Some(ControlAction::LowerAmplification));
        assert_eq!(ControlAction::from_key(Key::Character('q')), None);
    }

    #[test]
    fn rotation_with_no_devices_is_a_no_op() {
        let mut controls = state();
        controls.apply(ControlAction::RotateLeft, 0);
        controls.apply(ControlAction::RotateRight, 0);
        assert_eq!(controls.topmost(), 0);
    }

    #[test]
    fn rotation_wraps_both_ways() {
        let mut controls = state();
        controls.apply(ControlAction::RotateLeft, 3);
        assert_eq!(controls.topmost(), 2);
        controls.apply(ControlAction::RotateRight, 3);
        controls.apply(ControlAction::RotateRight, 3);
        assert_eq!(controls.topmost(), 1);
    }

    #[test]
    fn rotation_recovers_from_stale_topmost() {
        let mut controls = state();
        for _ in 0..4 {
            controls.apply(ControlAction::RotateRight, 5);
        }
        assert_eq!(controls.topmost(), 4);
        controls.apply(ControlAction::RotateLeft, 2);
        assert_eq!(controls.topmost(), 1);
    }

    #[test]
    fn adjustments_stay_in_range() {
        let mut controls = state();
        for _ in 0..20 {
            controls.apply(ControlAction::NarrowFrequency, 1);
            controls.apply(ControlAction::RaiseAmplification, 1);
            controls.apply(ControlAction::LowerSampleClamp, 1);
        }
        assert_relative_eq!(controls.frequency_ceiling.current(), 100.0);
        assert_relative_eq!(controls.amplification.current(), 100.0);
        assert_relative_eq!(controls.sample_clamp.current(), 1.0);

        controls.apply(ControlAction::RaiseSampleClamp, 1);
        assert_relative_eq!(controls.sample_clamp.current(), 2.0);
    }

    #[test]
    fn draw_order_starts_at_topmost() {
        assert_eq!(draw_order(3, 1).collect::<Vec<_>>(), vec![1, 2, 0]);
        assert_eq!(draw_order(0, 2).count(), 0);
    }
}
