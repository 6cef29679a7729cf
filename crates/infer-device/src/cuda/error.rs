use std::ffi::CStr;

use super::ffi;
use crate::base::StatusCode;

/// Check the return value of a CUDA runtime call.
///
/// Evaluates to `Ok(())` on `cudaSuccess`, otherwise to `Err(StatusCode)`
/// holding the raw `cudaError_t`.
#[macro_export]
macro_rules! cuda_status {
    ($expr:expr) => {{
        let result = $expr;
        if result != $crate::cuda::ffi::cudaError_cudaSuccess {
            Err($crate::base::StatusCode(result as i32))
        } else {
            Ok(())
        }
    }};
}

/// `"<name>: <description>"` for a runtime status, e.g.
/// `"cudaErrorInvalidDevice: invalid device ordinal"`.
pub fn describe(status: StatusCode) -> Option<String> {
    // StatusCode keeps the raw cudaError_t, so the cast back is lossless.
    let code = status.code() as ffi::cudaError_t;
    // SAFETY: both functions accept any value and return static strings.
    let name_ptr = unsafe { ffi::cudaGetErrorName(code) };
    let str_ptr = unsafe { ffi::cudaGetErrorString(code) };

    if name_ptr.is_null() || str_ptr.is_null() {
        return None;
    }

    // SAFETY: non-null pointers to NUL-terminated static strings owned by the runtime.
    let name = unsafe { CStr::from_ptr(name_ptr) }.to_string_lossy();
    let description = unsafe { CStr::from_ptr(str_ptr) }.to_string_lossy();
    Some(format!("{}: {}", name, description))
}
