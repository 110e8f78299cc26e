use thiserror::Error;

/// Errors raised by the capture-to-spectrum pipeline.
///
/// `DeviceUnavailable` and `ConfigurationFailed` are fatal at startup.
/// Everything else is scoped to one device for one tick, or to one resize.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("device not available: {0}")]
    DeviceUnavailable(String),

    #[error("capture position unavailable")]
    PositionUnavailable,

    #[error("lock failed: {0}")]
    LockFailed(String),

    #[error("allocation of {requested} elements failed")]
    AllocationFailed { requested: usize },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

impl CaptureError {
    /// Whether the error only affects the current tick of a single device.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::PositionUnavailable | Self::LockFailed(_) | Self::InvariantViolation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_scoped_errors_are_transient() {
        assert!(CaptureError::PositionUnavailable.is_transient());
        assert!(CaptureError::LockFailed("busy".into()).is_transient());
        assert!(CaptureError::InvariantViolation("split".into()).is_transient());
    }

    #[test]
    fn startup_errors_are_fatal() {
        assert!(!CaptureError::DeviceUnavailable("gone".into()).is_transient());
        assert!(!CaptureError::ConfigurationFailed("bad".into()).is_transient());
        assert!(!CaptureError::AllocationFailed { requested: 4 }.is_transient());
    }

    #[test]
    fn messages_carry_context() {
        let err = CaptureError::AllocationFailed { requested: 1920 };
        assert_eq!(err.to_string(), "allocation of 1920 elements failed");
    }
}
