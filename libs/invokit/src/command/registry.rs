//! Registry of compiled command configurations, one per service.
//!
//! Re-declaring a service assembles a fresh [`CommandConfig`] and supersedes
//! the previous one atomically; consumers holding the old `Arc` keep a
//! consistent (if stale) view until they re-fetch.

use std::sync::Arc;

use dashmap::DashMap;

use super::assemble::{ConfigurationError, assemble};
use super::config::CommandConfig;
use super::declaration::ServiceDeclaration;
use crate::events::EventBus;

/// Payload emitted on the command bus, keyed by service name.
#[derive(Clone, Debug)]
pub struct CommandConfigUpdate {
    pub service_name: String,
    pub config: Arc<CommandConfig>,
}

/// Holds the current [`CommandConfig`] per service and announces changes.
pub struct CommandConfigRegistry {
    configs: DashMap<String, Arc<CommandConfig>>,
    bus: Arc<EventBus<CommandConfigUpdate>>,
}

impl CommandConfigRegistry {
    pub fn new(bus: Arc<EventBus<CommandConfigUpdate>>) -> Self {
        Self {
            configs: DashMap::new(),
            bus,
        }
    }

    /// Assemble `declaration` and install the result, superseding any
    /// previous config for the same service. Emits a [`CommandConfigUpdate`]
    /// under the service-name key after the swap.
    ///
    /// # Errors
    /// Propagates [`ConfigurationError`] from assembly; on error the
    /// previously installed config (if any) is left untouched.
    pub fn register(
        &self,
        declaration: &ServiceDeclaration,
    ) -> Result<Arc<CommandConfig>, ConfigurationError> {
        let config = Arc::new(assemble(declaration)?);
        let service_name = config.service_name().to_owned();

        self.configs.insert(service_name.clone(), config.clone());
        tracing::debug!(service = %service_name, "command config installed");

        self.bus.emit(
            &service_name,
            &CommandConfigUpdate {
                service_name: service_name.clone(),
                config: config.clone(),
            },
        );
        Ok(config)
    }

    /// Current config for `service_name`, if one has been registered.
    pub fn get(&self, service_name: &str) -> Option<Arc<CommandConfig>> {
        self.configs.get(service_name).map(|entry| entry.clone())
    }

    /// Names of all registered services.
    pub fn service_names(&self) -> Vec<String> {
        self.configs.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn bus(&self) -> &Arc<EventBus<CommandConfigUpdate>> {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn declaration(service_name: &str, retry: i32) -> ServiceDeclaration {
        ServiceDeclaration {
            service_name: service_name.to_owned(),
            retry,
            ..ServiceDeclaration::default()
        }
    }

    #[test]
    fn register_installs_and_emits_under_service_key() {
        let bus = Arc::new(EventBus::new());
        let registry = CommandConfigRegistry::new(bus.clone());

        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        bus.subscribe("orders", move |update: &CommandConfigUpdate| {
            assert_eq!(update.service_name, "orders");
            assert_eq!(update.config.retry(), 2);
            s.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        registry.register(&declaration("orders", 2)).unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(registry.get("orders").unwrap().retry(), 2);
    }

    #[test]
    fn re_registration_supersedes_but_held_arcs_stay_valid() {
        let registry = CommandConfigRegistry::new(Arc::new(EventBus::new()));

        let first = registry.register(&declaration("orders", 1)).unwrap();
        let second = registry.register(&declaration("orders", 5)).unwrap();

        assert_eq!(first.retry(), 1, "held Arc keeps the superseded config");
        assert_eq!(second.retry(), 5);
        assert!(Arc::ptr_eq(&registry.get("orders").unwrap(), &second));
    }

    #[test]
    fn failed_assembly_leaves_previous_config_in_place() {
        let registry = CommandConfigRegistry::new(Arc::new(EventBus::new()));
        registry.register(&declaration("orders", 1)).unwrap();

        let result = registry.register(&declaration("orders", -3));

        assert!(result.is_err());
        assert_eq!(registry.get("orders").unwrap().retry(), 1);
    }

    #[test]
    fn get_for_unknown_service_is_none() {
        let registry = CommandConfigRegistry::new(Arc::new(EventBus::new()));
        assert!(registry.get("nope").is_none());
    }
}
