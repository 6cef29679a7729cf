pub mod error;

use std::fmt;

/// Ordinal of a physical accelerator, as the device runtime numbers them.
///
/// Validity is decided by the registry at call time, never locally.
pub type DeviceId = i32;

/// Device selected by `set_default` unless a [`crate::config::DeviceConfig`]
/// says otherwise.
pub const DEFAULT_DEVICE_ID: DeviceId = 0;

/// Raw result code of an external device-runtime call.
///
/// Exactly one value means success; every other value is kept verbatim so
/// callers can map it back to the runtime's own error table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const SUCCESS: StatusCode = StatusCode(0);

    /// Same value as `cudaErrorInvalidDevice`.
    pub const INVALID_DEVICE: StatusCode = StatusCode(101);

    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    #[inline]
    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        StatusCode(code)
    }
}
