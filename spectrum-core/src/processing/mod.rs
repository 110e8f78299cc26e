pub mod simulated_stream;
pub mod spectrum_engine;
pub mod waterfall;
pub mod window_extractor;

use crate::models::error::CaptureError;

/// Zero-filled buffer of `len` elements, reporting allocation failure
/// instead of aborting.
pub(crate) fn zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>, CaptureError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| CaptureError::AllocationFailed { requested: len })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}
