//! Device Configuration Module
//!
//! `DeviceConfig` holds the per-process knobs of the device layer and
//! `DeviceContext` binds one registry to one config. The context is the
//! explicit handle passed to every accessor and override.
//!
//! ```json
//! { "default_device_id": 1, "restore_failure": "panic" }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::base::error::Result as DeviceResult;
use crate::base::{DeviceId, StatusCode, DEFAULT_DEVICE_ID};
use crate::current::{AssumedCurrentOverride, ScopedDeviceOverride};
use crate::registry::{self, DeviceRegistry};

/// What a dropped [`ScopedDeviceOverride`] does when the restore fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreFailurePolicy {
    /// Report through `tracing::error!` and continue.
    #[default]
    Log,
    /// Panic with the restore error as payload, unless already unwinding.
    Panic,
}

/// Device layer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device selected by `set_default`
    pub default_device_id: DeviceId,
    /// Policy for restore failures in drop
    pub restore_failure: RestoreFailurePolicy,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            default_device_id: DEFAULT_DEVICE_ID,
            restore_failure: RestoreFailurePolicy::Log,
        }
    }
}

impl DeviceConfig {
    /// Load from a `.json` file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            anyhow::bail!(
                "Unsupported config file format for {} (use .json)",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid device config in {}", path.display()))
    }

    /// Parse from a JSON document and validate. Missing fields take defaults.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).context("Failed to parse JSON config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_device_id < 0 {
            anyhow::bail!(
                "default_device_id must be non-negative, got {}",
                self.default_device_id
            );
        }
        Ok(())
    }

    pub fn with_default_device(mut self, device: DeviceId) -> Self {
        self.default_device_id = device;
        self
    }

    pub fn with_restore_failure(mut self, policy: RestoreFailurePolicy) -> Self {
        self.restore_failure = policy;
        self
    }
}

/// A registry bound to its configuration.
///
/// Implements [`DeviceRegistry`] itself, so it can be passed anywhere a
/// registry is expected; the config supplies the default device and the
/// restore-failure policy.
#[derive(Debug)]
pub struct DeviceContext<R: DeviceRegistry> {
    registry: R,
    config: DeviceConfig,
}

impl<R: DeviceRegistry> DeviceContext<R> {
    pub fn new(registry: R, config: DeviceConfig) -> Self {
        tracing::debug!(
            "device context created: default device {}, restore failure policy {:?}",
            config.default_device_id,
            config.restore_failure
        );
        Self { registry, config }
    }

    pub fn with_defaults(registry: R) -> Self {
        Self::new(registry, DeviceConfig::default())
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn into_inner(self) -> R {
        self.registry
    }

    pub fn get_current(&self) -> DeviceResult<DeviceId> {
        registry::get_current(self)
    }

    pub fn set_current(&self, device: DeviceId) -> DeviceResult<()> {
        registry::set_current(self, device)
    }

    pub fn set_default(&self) -> DeviceResult<()> {
        registry::set_default(self)
    }

    /// Full save/switch/restore override on this context.
    pub fn scoped_override(
        &self,
        device: DeviceId,
    ) -> DeviceResult<ScopedDeviceOverride<'_, Self>> {
        ScopedDeviceOverride::push(self, device)
    }

    /// No-op override; the caller asserts `device` is already current.
    pub fn assume_current(&self, device: DeviceId) -> AssumedCurrentOverride {
        AssumedCurrentOverride::push(self, device)
    }
}

impl<R: DeviceRegistry> DeviceRegistry for DeviceContext<R> {
    fn get_device(&self) -> std::result::Result<DeviceId, StatusCode> {
        self.registry.get_device()
    }

    fn set_device(&self, device: DeviceId) -> std::result::Result<(), StatusCode> {
        self.registry.set_device(device)
    }

    fn describe_status(&self, status: StatusCode) -> Option<String> {
        self.registry.describe_status(status)
    }

    fn default_device(&self) -> DeviceId {
        self.config.default_device_id
    }

    fn restore_failure_policy(&self) -> RestoreFailurePolicy {
        self.config.restore_failure
    }
}
