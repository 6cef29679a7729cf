//! Device Registry Accessor
//!
//! The primitive layer: read and write the current-device slot through an
//! explicit [`DeviceRegistry`] handle, translating raw status codes into
//! typed [`Error`]s. Every call is single-shot; nothing is retried.

use crate::base::error::{Error, Result};
use crate::base::{DeviceId, StatusCode, DEFAULT_DEVICE_ID};
use crate::config::RestoreFailurePolicy;

const QUERY_CONTEXT: &str = "failure obtaining current device index";

/// Handle to one execution context's current-device slot.
///
/// Implementations forward to the external device runtime. The two slot
/// methods report the runtime's raw status on failure; translation into
/// [`Error`] happens in [`get_current`] and [`set_current`].
pub trait DeviceRegistry {
    /// Read the current device id.
    fn get_device(&self) -> std::result::Result<DeviceId, StatusCode>;

    /// Make `device` current. The slot value after a failure is unspecified.
    fn set_device(&self, device: DeviceId) -> std::result::Result<(), StatusCode>;

    /// Human-readable name for a failure status, if the runtime has one.
    fn describe_status(&self, _status: StatusCode) -> Option<String> {
        None
    }

    /// Device selected by [`set_default`].
    fn default_device(&self) -> DeviceId {
        DEFAULT_DEVICE_ID
    }

    /// What a scoped override does when restoring the previous device fails
    /// during drop.
    fn restore_failure_policy(&self) -> RestoreFailurePolicy {
        RestoreFailurePolicy::Log
    }
}

impl<R: DeviceRegistry + ?Sized> DeviceRegistry for &R {
    fn get_device(&self) -> std::result::Result<DeviceId, StatusCode> {
        (**self).get_device()
    }

    fn set_device(&self, device: DeviceId) -> std::result::Result<(), StatusCode> {
        (**self).set_device(device)
    }

    fn describe_status(&self, status: StatusCode) -> Option<String> {
        (**self).describe_status(status)
    }

    fn default_device(&self) -> DeviceId {
        (**self).default_device()
    }

    fn restore_failure_policy(&self) -> RestoreFailurePolicy {
        (**self).restore_failure_policy()
    }
}

fn reason_for<R: DeviceRegistry + ?Sized>(registry: &R, status: StatusCode) -> String {
    registry
        .describe_status(status)
        .unwrap_or_else(|| "unknown error".to_string())
}

/// Query the current device.
pub fn get_current<R: DeviceRegistry + ?Sized>(registry: &R) -> Result<DeviceId> {
    match registry.get_device() {
        Ok(device) => {
            tracing::trace!("current device is {}", device);
            Ok(device)
        }
        Err(status) => {
            tracing::debug!("querying current device failed with status {}", status);
            Err(Error::DeviceQuery {
                status,
                context: QUERY_CONTEXT.to_string(),
                reason: reason_for(registry, status),
            })
        }
    }
}

/// Make `device` the current device.
///
/// Visible to every later call on the same context until changed again. No
/// rollback is attempted when the runtime rejects the switch.
pub fn set_current<R: DeviceRegistry + ?Sized>(registry: &R, device: DeviceId) -> Result<()> {
    match registry.set_device(device) {
        Ok(()) => {
            tracing::trace!("current device set to {}", device);
            Ok(())
        }
        Err(status) => {
            tracing::debug!("setting device {} failed with status {}", device, status);
            Err(Error::DeviceSet {
                status,
                context: format!("failure setting device to {}", device),
                attempted: device,
                reason: reason_for(registry, status),
            })
        }
    }
}

/// Select the registry's default device (device 0 unless configured).
pub fn set_default<R: DeviceRegistry + ?Sized>(registry: &R) -> Result<()> {
    set_current(registry, registry.default_device())
}
