//! Registry configuration.

use serde::{Deserialize, Serialize};

/// What `subscribe` does when the key already has handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    /// Append to the existing handlers; all of them fire.
    #[default]
    Accumulate,
    /// Drop the existing handlers; the key keeps only the new one.
    Replace,
}

/// How `publish` treats a handler that panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Catch the panic, keep dispatching, report all failures at the end.
    #[default]
    Isolate,
    /// Let the panic unwind out of `publish`; remaining handlers are skipped.
    Propagate,
}

/// Configuration for an event registry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Duplicate-key behavior of `subscribe`.
    pub key_policy: KeyPolicy,
    /// Handler panic behavior of `publish`.
    pub failure_policy: FailurePolicy,
    /// Number of keys to reserve space for up front.
    pub initial_capacity: usize,
}

impl RegistryConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key policy.
    pub fn with_key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// Sets the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the initial key capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.key_policy, KeyPolicy::Accumulate);
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
        assert_eq!(config.initial_capacity, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = RegistryConfig::new()
            .with_key_policy(KeyPolicy::Replace)
            .with_failure_policy(FailurePolicy::Propagate)
            .with_initial_capacity(16);

        assert_eq!(config.key_policy, KeyPolicy::Replace);
        assert_eq!(config.failure_policy, FailurePolicy::Propagate);
        assert_eq!(config.initial_capacity, 16);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"key_policy": "replace"}"#).unwrap();

        assert_eq!(config.key_policy, KeyPolicy::Replace);
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
    }

    #[test]
    fn test_config_serialize() {
        let config = RegistryConfig::new().with_failure_policy(FailurePolicy::Propagate);
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["key_policy"], "accumulate");
        assert_eq!(json["failure_policy"], "propagate");
        assert_eq!(json["initial_capacity"], 0);
    }
}
