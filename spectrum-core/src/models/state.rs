use super::error::CaptureError;

/// What happened to one device during one pipeline tick.
///
/// ```text
/// poll cursor ─┬─ failed ────────────────→ Skipped(error)
///              ├─ aligned block unchanged → Unchanged
///              └─ new aligned block ─┬─ copy failed → Skipped(error)
///                                    └─ copied ─────→ WindowTransformed
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceTickOutcome {
    Unchanged,
    WindowTransformed,
    Skipped(CaptureError),
}

impl DeviceTickOutcome {
    pub fn is_transformed(&self) -> bool {
        matches!(self, Self::WindowTransformed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            Self::Skipped(err) => Some(err),
            _ => None,
        }
    }
}

/// Per-device outcomes of one tick, indexed by device index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub outcomes: Vec<DeviceTickOutcome>,
    pub waterfall_advanced: bool,
}

impl TickReport {
    pub fn transformed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_transformed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }
}
