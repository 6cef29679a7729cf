//! In-process simulated device registry.
//!
//! Stands in for the device runtime on CPU-only builds and in tests: a
//! current-device slot over a fixed number of devices, a log of every call
//! made against it, and failure injection for both primitives.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::base::{DeviceId, StatusCode};
use crate::registry::DeviceRegistry;

/// One call observed by a [`SimulatedRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryCall {
    Get,
    Set(DeviceId),
}

/// Simulated current-device slot for one execution context.
///
/// `!Sync`: like a real per-thread device slot it must not be mutated from
/// two threads at once.
#[derive(Debug)]
pub struct SimulatedRegistry {
    device_count: i32,
    current: Cell<DeviceId>,
    calls: RefCell<Vec<RegistryCall>>,
    next_get_failure: Cell<Option<StatusCode>>,
    next_set_failure: Cell<Option<StatusCode>>,
    set_failures: RefCell<HashMap<DeviceId, StatusCode>>,
}

impl SimulatedRegistry {
    /// Registry over devices `0..device_count`, starting on device 0.
    pub fn new(device_count: i32) -> Self {
        Self::with_current(device_count, 0)
    }

    /// Registry starting on `current`. The starting value is not validated.
    pub fn with_current(device_count: i32, current: DeviceId) -> Self {
        Self {
            device_count,
            current: Cell::new(current),
            calls: RefCell::new(Vec::new()),
            next_get_failure: Cell::new(None),
            next_set_failure: Cell::new(None),
            set_failures: RefCell::new(HashMap::new()),
        }
    }

    pub fn device_count(&self) -> i32 {
        self.device_count
    }

    /// Slot value, read without recording a call.
    pub fn current(&self) -> DeviceId {
        self.current.get()
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.borrow().clone()
    }

    pub fn set_calls(&self) -> Vec<DeviceId> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                RegistryCall::Set(device) => Some(*device),
                RegistryCall::Get => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Fail the next `get_device` with `status`.
    pub fn fail_next_get(&self, status: StatusCode) {
        self.next_get_failure.set(Some(status));
    }

    /// Fail the next `set_device`, whatever device it targets.
    pub fn fail_next_set(&self, status: StatusCode) {
        self.next_set_failure.set(Some(status));
    }

    /// Fail every switch to `device` until [`clear_failures`](Self::clear_failures).
    pub fn fail_set_to(&self, device: DeviceId, status: StatusCode) {
        self.set_failures.borrow_mut().insert(device, status);
    }

    pub fn clear_failures(&self) {
        self.next_get_failure.set(None);
        self.next_set_failure.set(None);
        self.set_failures.borrow_mut().clear();
    }

    fn record(&self, call: RegistryCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl DeviceRegistry for SimulatedRegistry {
    fn get_device(&self) -> Result<DeviceId, StatusCode> {
        self.record(RegistryCall::Get);
        match self.next_get_failure.take() {
            Some(status) => Err(status),
            None => Ok(self.current.get()),
        }
    }

    fn set_device(&self, device: DeviceId) -> Result<(), StatusCode> {
        self.record(RegistryCall::Set(device));
        if let Some(status) = self.next_set_failure.take() {
            return Err(status);
        }
        if let Some(status) = self.set_failures.borrow().get(&device) {
            return Err(*status);
        }
        if device < 0 || device >= self.device_count {
            return Err(StatusCode::INVALID_DEVICE);
        }
        self.current.set(device);
        Ok(())
    }

    fn describe_status(&self, status: StatusCode) -> Option<String> {
        match status {
            StatusCode::INVALID_DEVICE => Some("invalid device ordinal".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_without_changing_slot() {
        let registry = SimulatedRegistry::with_current(2, 1);
        assert_eq!(registry.set_device(2), Err(StatusCode::INVALID_DEVICE));
        assert_eq!(registry.set_device(-1), Err(StatusCode::INVALID_DEVICE));
        assert_eq!(registry.current(), 1);
    }

    #[test]
    fn test_records_calls_in_order() {
        let registry = SimulatedRegistry::new(4);
        registry.get_device().unwrap();
        registry.set_device(3).unwrap();
        registry.get_device().unwrap();

        assert_eq!(
            registry.calls(),
            vec![RegistryCall::Get, RegistryCall::Set(3), RegistryCall::Get]
        );
        assert_eq!(registry.set_calls(), vec![3]);

        registry.clear_calls();
        assert!(registry.calls().is_empty());
    }

    #[test]
    fn test_one_shot_failures() {
        let registry = SimulatedRegistry::new(4);
        registry.fail_next_get(StatusCode(46));
        registry.fail_next_set(StatusCode(2));

        assert_eq!(registry.get_device(), Err(StatusCode(46)));
        assert_eq!(registry.get_device(), Ok(0));
        assert_eq!(registry.set_device(1), Err(StatusCode(2)));
        assert_eq!(registry.set_device(1), Ok(()));
    }

    #[test]
    fn test_persistent_set_failure() {
        let registry = SimulatedRegistry::new(4);
        registry.fail_set_to(2, StatusCode(999));

        assert_eq!(registry.set_device(2), Err(StatusCode(999)));
        assert_eq!(registry.set_device(2), Err(StatusCode(999)));
        assert_eq!(registry.set_device(3), Ok(()));

        registry.clear_failures();
        assert_eq!(registry.set_device(2), Ok(()));
        assert_eq!(registry.current(), 2);
    }
}
