use serde::{Deserialize, Serialize};

/// A capture source discovered during enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSource {
    /// Position in enumeration order; stable for the lifetime of the process.
    pub index: usize,
    pub name: String,
    pub is_default: bool,
    pub sample_rate: u32,
}

/// Counters for debugging the tick/render loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineDiagnostics {
    pub ticks: u64,
    pub windows_transformed: u64,
    pub waterfall_rows: u64,
    pub position_failures: u64,
    pub lock_failures: u64,
    pub invariant_violations: u64,
    pub renders: u64,
    pub skipped_resizes: u64,
}
