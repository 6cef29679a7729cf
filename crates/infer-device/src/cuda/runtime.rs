//! CUDA runtime backed device registry.

use std::os::raw::c_int;

use super::{error, ffi};
use crate::base::{DeviceId, StatusCode};
use crate::cuda_status;
use crate::registry::DeviceRegistry;

/// The calling host thread's CUDA current-device slot.
///
/// Stateless: the runtime keeps the slot per host thread, so every call
/// observes the thread it runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct CudaRuntime;

impl CudaRuntime {
    pub fn new() -> Self {
        CudaRuntime
    }

    /// Number of CUDA devices visible to this process.
    pub fn device_count(&self) -> Result<i32, StatusCode> {
        // Stays 0 if the driver reports no devices.
        let mut count: c_int = 0;
        // SAFETY: `count` is a valid out-pointer for the duration of the call.
        unsafe { cuda_status!(ffi::cudaGetDeviceCount(&mut count))? };
        Ok(count)
    }
}

impl DeviceRegistry for CudaRuntime {
    fn get_device(&self) -> Result<DeviceId, StatusCode> {
        // -1 until the runtime writes the real ordinal.
        let mut device: c_int = -1;
        // SAFETY: `device` is a valid out-pointer for the duration of the call.
        unsafe { cuda_status!(ffi::cudaGetDevice(&mut device))? };
        Ok(device)
    }

    fn set_device(&self, device: DeviceId) -> Result<(), StatusCode> {
        // cudaSetDevice only binds the ordinal to this host thread; it does
        // not create a context until the first real runtime call.
        // SAFETY: plain value argument; the runtime validates the ordinal.
        unsafe { cuda_status!(ffi::cudaSetDevice(device)) }
    }

    fn describe_status(&self, status: StatusCode) -> Option<String> {
        // Used only for error messages; never consulted for control flow.
        error::describe(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::current::ScopedDeviceOverride;
    use crate::registry;

    #[test]
    #[ignore = "requires a CUDA device; run with --features cuda -- --ignored"]
    fn test_cuda_override_restores() {
        let runtime = CudaRuntime::new();
        let count = runtime.device_count().expect("cudaGetDeviceCount failed");
        assert!(count > 0, "No CUDA devices visible");

        // Remember where this thread started so we can check the restore.
        let before = registry::get_current(&runtime).unwrap();
        {
            // Highest ordinal, so the switch is visible whenever count > 1.
            let _scope = ScopedDeviceOverride::push(&runtime, count - 1).unwrap();
            assert_eq!(registry::get_current(&runtime).unwrap(), count - 1);
        }
        assert_eq!(registry::get_current(&runtime).unwrap(), before);
    }

    #[test]
    #[ignore = "requires a CUDA device; run with --features cuda -- --ignored"]
    fn test_cuda_invalid_device() {
        let runtime = CudaRuntime::new();
        let err = registry::set_current(&runtime, 999).unwrap_err();
        assert_eq!(err.status(), StatusCode::INVALID_DEVICE);
        assert!(
            err.to_string().contains("cudaErrorInvalidDevice"),
            "Error should name the CUDA error: {}",
            err
        );
    }
}
