//! Configuration for the memory state store.

use serde::Deserialize;
use thiserror::Error;

/// Errors loading a [`StateConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text is not valid TOML or has unknown keys.
    #[error("invalid state config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the memory state store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateConfig {
    /// Whether pod-level resource managers are enabled.
    ///
    /// When enabled, `clear_state` also drops pod-level assignments. When
    /// disabled, pod-level assignments survive `clear_state` while
    /// container-level assignments and the topology are always reset.
    pub pod_level_resource_managers: bool,
}

impl StateConfig {
    /// Create a config with pod-level resource managers enabled or disabled.
    pub fn with_pod_level_resource_managers(enabled: bool) -> Self {
        Self {
            pod_level_resource_managers: enabled,
        }
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    ///
    /// ```toml
    /// pod_level_resource_managers = true
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Whether `clear_state` keeps pod-level assignments.
    pub fn preserves_pod_assignments_on_clear(&self) -> bool {
        !self.pod_level_resource_managers
    }
}
