//! Scoped Override Controller
//!
//! Bounded-lifetime changes to the current device.
//!
//! ```text
//! Uninitialized ──push──→ Active ──drop / restore──→ Restored
//!       │
//!       └── get or set failed: no guard exists, nothing owed
//! ```
//!
//! Two guard types, picked statically through [`OverrideKind`]:
//!
//! - [`ScopedDeviceOverride`] (`FullOverride`): saves the current device,
//!   switches, and restores the saved id exactly once when dropped.
//! - [`AssumedCurrentOverride`] (`AssumedCurrentNoOp`): zero-sized, makes no
//!   registry calls. The caller asserts the device is already current.
//!
//! Nested guards restore correctly because Rust drops locals in reverse
//! declaration order; each guard only restores the value it observed.

use std::marker::PhantomData;
use std::mem::ManuallyDrop;

use crate::base::error::{Error, Result};
use crate::base::DeviceId;
use crate::config::RestoreFailurePolicy;
use crate::registry::{self, DeviceRegistry};

// ---------------------------------------------------------------------------
// ScopedDeviceOverride
// ---------------------------------------------------------------------------

/// Full save/switch/restore override.
///
/// Not `Clone`, and `!Send`: the restore must run on the context whose slot
/// was saved.
///
/// # Drop Behavior
///
/// Restores the previous device. If that fails, the registry's
/// [`RestoreFailurePolicy`] decides: `Log` reports through `tracing` and
/// swallows the error, `Panic` panics with the [`Error`] as payload (or logs,
/// if the thread is already unwinding). Use [`restore`](Self::restore) to get
/// the error back as a value instead.
#[must_use = "the previous device is restored as soon as the override is dropped"]
#[derive(Debug)]
pub struct ScopedDeviceOverride<'r, R: DeviceRegistry + ?Sized> {
    registry: &'r R,
    previous: DeviceId,
    device: DeviceId,
    _not_send: PhantomData<*const ()>,
}

impl<'r, R: DeviceRegistry + ?Sized> ScopedDeviceOverride<'r, R> {
    /// Save the current device, then make `device` current.
    ///
    /// The read always happens before the switch. If either call fails the
    /// error is returned and no restore is issued later.
    pub fn push(registry: &'r R, device: DeviceId) -> Result<Self> {
        let previous = registry::get_current(registry)?;
        // Same-device pushes are forwarded as-is; the runtime decides
        // whether that is a no-op.
        registry::set_current(registry, device)?;
        tracing::debug!("device override pushed: {} -> {}", previous, device);

        Ok(Self {
            registry,
            previous,
            device,
            _not_send: PhantomData,
        })
    }

    /// Device that will be restored.
    #[inline]
    pub fn previous(&self) -> DeviceId {
        self.previous
    }

    /// Device this override made current.
    #[inline]
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Restore the previous device now and report failure to the caller.
    ///
    /// Consumes the guard, so the restore is still issued exactly once.
    pub fn restore(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        this.pop()
    }

    fn pop(&self) -> Result<()> {
        registry::set_current(self.registry, self.previous)?;
        tracing::debug!("device override popped: restored {}", self.previous);
        Ok(())
    }
}

impl<R: DeviceRegistry + ?Sized> Drop for ScopedDeviceOverride<'_, R> {
    fn drop(&mut self) {
        let err = match self.pop() {
            Ok(()) => return,
            Err(err) => err,
        };

        match self.registry.restore_failure_policy() {
            RestoreFailurePolicy::Panic if !std::thread::panicking() => {
                std::panic::panic_any(err);
            }
            _ => {
                tracing::error!(
                    "failed to restore device {} on scope exit: {}",
                    self.previous,
                    err
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// AssumedCurrentOverride
// ---------------------------------------------------------------------------

/// No-op override for call sites that know the device is already current.
///
/// Carries no previous id and issues no registry calls. A wrong assumption
/// is a caller bug and is not detected here.
#[must_use]
#[derive(Debug)]
pub struct AssumedCurrentOverride {
    _not_send: PhantomData<*const ()>,
}

impl AssumedCurrentOverride {
    #[inline(always)]
    pub fn push<R: DeviceRegistry + ?Sized>(_registry: &R, _device: DeviceId) -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Static variant selection
// ---------------------------------------------------------------------------

/// Construction half of a scoped override; destruction is `Drop`.
pub trait DeviceScope<'r, R: DeviceRegistry + ?Sized + 'r>: Sized {
    fn enter(registry: &'r R, device: DeviceId) -> Result<Self>;
}

impl<'r, R: DeviceRegistry + ?Sized + 'r> DeviceScope<'r, R> for ScopedDeviceOverride<'r, R> {
    fn enter(registry: &'r R, device: DeviceId) -> Result<Self> {
        Self::push(registry, device)
    }
}

impl<'r, R: DeviceRegistry + ?Sized + 'r> DeviceScope<'r, R> for AssumedCurrentOverride {
    #[inline(always)]
    fn enter(registry: &'r R, device: DeviceId) -> Result<Self> {
        Ok(Self::push(registry, device))
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::FullOverride {}
    impl Sealed for super::AssumedCurrentNoOp {}
}

/// Compile-time override-kind selector.
pub trait OverrideKind: sealed::Sealed {
    type Guard<'r, R: DeviceRegistry + ?Sized + 'r>: DeviceScope<'r, R>;
}

/// Do not assume the device is current: save, switch, restore.
#[derive(Debug)]
pub enum FullOverride {}

/// Assume the device is already current: do nothing.
#[derive(Debug)]
pub enum AssumedCurrentNoOp {}

impl OverrideKind for FullOverride {
    type Guard<'r, R: DeviceRegistry + ?Sized + 'r> = ScopedDeviceOverride<'r, R>;
}

impl OverrideKind for AssumedCurrentNoOp {
    type Guard<'r, R: DeviceRegistry + ?Sized + 'r> = AssumedCurrentOverride;
}

/// Enter an override of kind `K` for `device`.
///
/// ```ignore
/// let _scope = scoped_override::<FullOverride, _>(&registry, 1)?;
/// ```
pub fn scoped_override<'r, K, R>(registry: &'r R, device: DeviceId) -> Result<K::Guard<'r, R>>
where
    K: OverrideKind,
    R: DeviceRegistry + ?Sized + 'r,
{
    <K::Guard<'r, R> as DeviceScope<'r, R>>::enter(registry, device)
}

/// Run `f` with `device` current, restoring the previous device afterwards.
///
/// When `f` succeeds a failed restore is returned as the error. When `f`
/// fails its error wins and the restore goes through `Drop`.
pub fn with_device<R, T, E, F>(registry: &R, device: DeviceId, f: F) -> std::result::Result<T, E>
where
    R: DeviceRegistry + ?Sized,
    E: From<Error>,
    F: FnOnce() -> std::result::Result<T, E>,
{
    let scope = ScopedDeviceOverride::push(registry, device)?;
    let value = f()?;
    scope.restore()?;
    Ok(value)
}

/// Make a device current until the end of the enclosing block.
///
/// Expands to a `let` binding of a [`ScopedDeviceOverride`], so it needs a
/// function returning a `Result` whose error converts from [`Error`].
///
/// ```ignore
/// fn run(registry: &SimulatedRegistry) -> infer_device::Result<()> {
///     infer_device::device_for_this_scope!(registry, 1);
///     // device 1 is current here
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! device_for_this_scope {
    ($registry:expr, $device:expr) => {
        let _device_for_this_scope =
            $crate::current::ScopedDeviceOverride::push(&$registry, $device)?;
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
