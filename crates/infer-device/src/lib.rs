//! Current-device management for the RustInfer runtime.
//!
//! - [`registry`]: read and switch the current device through a
//!   [`DeviceRegistry`] handle.
//! - [`current`]: scoped overrides that restore the previous device on every
//!   exit path, plus a zero-cost variant for call sites that already know the
//!   device is current.
//!
//! ```ignore
//! use infer_device::{DeviceContext, SimulatedRegistry};
//!
//! let ctx = DeviceContext::with_defaults(SimulatedRegistry::new(4));
//! {
//!     let _scope = ctx.scoped_override(3)?;
//!     // device 3 is current here
//! }
//! assert_eq!(ctx.get_current()?, 0);
//! ```

pub mod base;
pub mod config;
pub mod current;
pub mod registry;
pub mod sim;

// CUDA runtime backend (only available when cuda feature is enabled)
#[cfg(feature = "cuda")]
pub mod cuda;

pub use base::error::{Error, Result};
pub use base::{DeviceId, StatusCode, DEFAULT_DEVICE_ID};
pub use config::{DeviceConfig, DeviceContext, RestoreFailurePolicy};
pub use current::{
    scoped_override, with_device, AssumedCurrentNoOp, AssumedCurrentOverride, DeviceScope,
    FullOverride, OverrideKind, ScopedDeviceOverride,
};
pub use registry::{get_current, set_current, set_default, DeviceRegistry};
pub use sim::{RegistryCall, SimulatedRegistry};

#[cfg(feature = "cuda")]
pub use cuda::CudaRuntime;
