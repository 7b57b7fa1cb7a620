//! Typed configuration for the invocation runtime.
//!
//! Loading is layered the usual way: serialized defaults, then
//! `invokit.toml`, then `INVOKIT__`-prefixed environment variables split on
//! `__`. Everything works configless with defaults.

use std::collections::HashMap;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::command::ServiceDeclaration;
use crate::discovery::StaticEndpoint;

/// Per-integration enablement flag for the pluggable-registry variant.
/// Unset means enabled: an integration that is present in the process is
/// used unless explicitly switched off.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    pub enabled: bool,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration of the discovery layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Enablement flags keyed by integration name (e.g. "consul").
    pub integrations: HashMap<String, IntegrationConfig>,
    /// Interval for the scheduled cache refresh.
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Statically declared endpoints, keyed by service name. Used by the
    /// static discovery variant.
    pub static_endpoints: HashMap<String, Vec<StaticEndpoint>>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            integrations: HashMap::new(),
            refresh_interval: Duration::from_secs(30),
            static_endpoints: HashMap::new(),
        }
    }
}

impl DiscoveryConfig {
    /// Whether the named integration is enabled. Defaults to true when the
    /// integration has no explicit entry.
    pub fn integration_enabled(&self, name: &str) -> bool {
        self.integrations.get(name).is_none_or(|cfg| cfg.enabled)
    }
}

/// Root configuration record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokitConfig {
    pub discovery: DiscoveryConfig,
    /// Declarative per-service invocation policies, assembled at
    /// registration time.
    pub services: Vec<ServiceDeclaration>,
}

impl InvokitConfig {
    /// Load configuration: defaults, then `invokit.toml`, then environment.
    ///
    /// # Errors
    /// Propagates figment extraction errors (malformed file or env value).
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Self::default()))
                .merge(Toml::file("invokit.toml"))
                .merge(Env::prefixed("INVOKIT__").split("__")),
        )
    }

    /// Extract from a prepared figment (test and embedding hook).
    ///
    /// # Errors
    /// Propagates figment extraction errors.
    pub fn from_figment(figment: Figment) -> Result<Self, Box<figment::Error>> {
        figment.extract().map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_work_configless() {
        let config =
            InvokitConfig::from_figment(Figment::from(Serialized::defaults(
                InvokitConfig::default(),
            )))
            .unwrap();

        assert_eq!(config.discovery.refresh_interval, Duration::from_secs(30));
        assert!(config.discovery.integrations.is_empty());
        assert!(config.services.is_empty());
    }

    #[test]
    fn unset_integration_defaults_to_enabled() {
        let config = DiscoveryConfig::default();
        assert!(config.integration_enabled("consul"));
    }

    #[test]
    fn toml_sections_parse_with_humantime_durations() {
        let raw = r#"
            [discovery]
            refresh_interval = "5s"

            [discovery.integrations.consul]
            enabled = false

            [[discovery.static_endpoints.orders]]
            host = "10.0.0.1"
            port = 8080
            secure = true

            [[services]]
            service_name = "orders"
            retry = 2
            versions = ["v1", "v2"]
        "#;

        let config = InvokitConfig::from_figment(
            Figment::from(Serialized::defaults(InvokitConfig::default()))
                .merge(Toml::string(raw)),
        )
        .unwrap();

        assert_eq!(config.discovery.refresh_interval, Duration::from_secs(5));
        assert!(!config.discovery.integration_enabled("consul"));
        assert!(config.discovery.integration_enabled("eureka"));

        let endpoints = &config.discovery.static_endpoints["orders"];
        assert_eq!(endpoints.len(), 1);
        assert!(endpoints[0].secure);

        assert_eq!(config.services.len(), 1);
        assert_eq!(config.services[0].retry, 2);
    }

    #[test]
    fn environment_overrides_file_values() {
        temp_env::with_var("INVOKIT__DISCOVERY__REFRESH_INTERVAL", Some("90s"), || {
            let config = InvokitConfig::from_figment(
                Figment::from(Serialized::defaults(InvokitConfig::default()))
                    .merge(Env::prefixed("INVOKIT__").split("__")),
            )
            .unwrap();
            assert_eq!(config.discovery.refresh_interval, Duration::from_secs(90));
        });
    }
}
