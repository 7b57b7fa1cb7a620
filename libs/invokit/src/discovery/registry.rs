//! Pluggable-registry discovery variant.
//!
//! The context does not know how its client reaches the registry
//! (consul/eureka/zookeeper-equivalent or anything else); it resolves an
//! [`RegistryClient`] from the [`DependencyHub`] lazily, converts the
//! client's native records into readiness-gated [`ServerInstance`]s, and
//! keeps a monotonic "discovery enabled" latch derived from integration
//! probes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::context::{DiscoveryError, ServerContext};
use super::instance::ServerInstance;
use crate::config::DiscoveryConfig;
use crate::hub::DependencyHub;

/// Native instance record as reported by a registry client.
#[derive(Clone, Debug)]
pub struct RegistryInstance {
    pub service_name: String,
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub metadata: HashMap<String, String>,
}

/// External collaborator: a client for some service registry.
///
/// Implementations own their transport, timeouts, and failure handling; this
/// core imposes none of its own and propagates whatever latency or failure
/// the client has.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// All service names the registry currently knows.
    async fn service_names(&self) -> anyhow::Result<Vec<String>>;

    /// Instances registered for `service_name`. `None` means the registry
    /// has no record of the service at all; it converts to an empty
    /// sequence, never an error.
    async fn instances(
        &self,
        service_name: &str,
    ) -> anyhow::Result<Option<Vec<RegistryInstance>>>;
}

/// One registry integration that may or may not be present in the current
/// process. Capability detection is isolated behind the probe closure so the
/// rest of the design stays agnostic to how detection happens.
#[derive(Clone)]
pub struct RegistryIntegration {
    name: &'static str,
    probe: Arc<dyn Fn() -> bool + Send + Sync>,
}

impl RegistryIntegration {
    pub fn new(name: &'static str, probe: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self {
            name,
            probe: Arc::new(probe),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Discovery context backed by a pluggable registry client.
pub struct RegistryServerContext {
    hub: Arc<DependencyHub>,
    integrations: Vec<RegistryIntegration>,
    config: ArcSwap<DiscoveryConfig>,
    /// Monotonic latch: once discovery is detected enabled it never reverts,
    /// avoiding flapping discovery mode when configuration churns.
    enabled: AtomicBool,
    /// Scoped to "resolve the client once"; every other operation reads the
    /// memoized slot without locking.
    resolve_lock: Mutex<()>,
    /// Memoized resolution outcome. `Some(None)` records a failed
    /// resolution, which is deliberately not retried: the context is
    /// permanently unusable for discovery without external intervention.
    client: OnceLock<Option<Arc<dyn RegistryClient>>>,
}

impl RegistryServerContext {
    pub fn new(
        hub: Arc<DependencyHub>,
        integrations: Vec<RegistryIntegration>,
        config: DiscoveryConfig,
    ) -> Self {
        let context = Self {
            hub,
            integrations,
            config: ArcSwap::from_pointee(config),
            enabled: AtomicBool::new(false),
            resolve_lock: Mutex::new(()),
            client: OnceLock::new(),
        };
        context.probe();
        context
    }

    /// Swap in a new discovery configuration and re-probe. The enablement
    /// latch can only move from false to true.
    pub fn update_config(&self, config: DiscoveryConfig) {
        self.config.store(Arc::new(config));
        self.probe();
    }

    /// Re-run the integration probes against the current configuration.
    /// Returns the (possibly latched) enablement state.
    fn probe(&self) -> bool {
        if self.enabled.load(Ordering::Acquire) {
            return true;
        }
        let config = self.config.load();
        let hit = self.integrations.iter().find(|integration| {
            (integration.probe)() && config.integration_enabled(integration.name)
        });
        if let Some(integration) = hit {
            tracing::debug!(integration = integration.name, "registry discovery enabled");
            self.enabled.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Resolve the registry client, memoizing the outcome.
    fn client(&self) -> Result<Arc<dyn RegistryClient>, DiscoveryError> {
        if let Some(slot) = self.client.get() {
            return slot.clone().ok_or_else(Self::missing_client);
        }

        let _guard = self.resolve_lock.lock();
        // A concurrent first caller may have resolved while we waited.
        if let Some(slot) = self.client.get() {
            return slot.clone().ok_or_else(Self::missing_client);
        }

        let resolved = self.hub.get::<dyn RegistryClient>().ok();
        if resolved.is_none() {
            tracing::error!(
                client_type = std::any::type_name::<dyn RegistryClient>(),
                "registry client resolution failed; discovery is unusable for this context"
            );
        }
        let slot = self.client.get_or_init(|| resolved);
        slot.clone().ok_or_else(Self::missing_client)
    }

    fn missing_client() -> DiscoveryError {
        DiscoveryError::DependencyMissing {
            client_type: std::any::type_name::<dyn RegistryClient>(),
        }
    }
}

/// Convert one native record into a canonical instance: fields copied
/// verbatim, all metadata pairs carried over, readiness granted last.
fn convert_instance(native: RegistryInstance) -> ServerInstance {
    let mut instance = ServerInstance::new(
        native.service_name,
        native.host,
        native.port,
        native.secure,
    );
    instance.extend_metadata(native.metadata);
    instance.mark_ready();
    instance
}

/// An absent native list converts to an empty sequence, never an error.
fn convert_instances(native: Option<Vec<RegistryInstance>>) -> Vec<ServerInstance> {
    native
        .unwrap_or_default()
        .into_iter()
        .map(convert_instance)
        .collect()
}

#[async_trait]
impl ServerContext for RegistryServerContext {
    fn is_discovery_enabled(&self) -> bool {
        self.probe()
    }

    async fn list_service_names(&self) -> Result<Vec<String>, DiscoveryError> {
        if !self.is_discovery_enabled() {
            return Ok(Vec::new());
        }
        let client = self.client()?;
        client
            .service_names()
            .await
            .map_err(|source| DiscoveryError::Backend { source })
    }

    async fn list_instances(
        &self,
        service_name: &str,
    ) -> Result<Vec<ServerInstance>, DiscoveryError> {
        if !self.is_discovery_enabled() {
            return Ok(Vec::new());
        }
        let client = self.client()?;
        let native = client
            .instances(service_name)
            .await
            .map_err(|source| DiscoveryError::Backend { source })?;
        Ok(convert_instances(native))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRegistry {
        services: HashMap<String, Option<Vec<RegistryInstance>>>,
    }

    #[async_trait]
    impl RegistryClient for FakeRegistry {
        async fn service_names(&self) -> anyhow::Result<Vec<String>> {
            Ok(self.services.keys().cloned().collect())
        }

        async fn instances(
            &self,
            service_name: &str,
        ) -> anyhow::Result<Option<Vec<RegistryInstance>>> {
            Ok(self.services.get(service_name).cloned().flatten())
        }
    }

    fn native_instance() -> RegistryInstance {
        RegistryInstance {
            service_name: "orders".to_owned(),
            host: "10.0.0.1".to_owned(),
            port: 8080,
            secure: false,
            metadata: HashMap::from([
                ("zone".to_owned(), "a".to_owned()),
                ("weight".to_owned(), "10".to_owned()),
            ]),
        }
    }

    fn always_on() -> Vec<RegistryIntegration> {
        vec![RegistryIntegration::new("consul", || true)]
    }

    fn context_with_client(
        services: HashMap<String, Option<Vec<RegistryInstance>>>,
    ) -> RegistryServerContext {
        let hub = Arc::new(DependencyHub::new());
        hub.register::<dyn RegistryClient>(Arc::new(FakeRegistry { services }));
        RegistryServerContext::new(hub, always_on(), DiscoveryConfig::default())
    }

    #[test]
    fn conversion_copies_fields_and_grants_readiness_last() {
        let instance = convert_instance(native_instance());

        assert!(instance.is_ready());
        assert_eq!(instance.service_name(), "orders");
        assert_eq!(instance.host(), "10.0.0.1");
        assert_eq!(instance.port(), 8080);
        assert!(!instance.is_secure());
        assert_eq!(instance.metadata().get("zone").map(String::as_str), Some("a"));
        assert_eq!(
            instance.metadata().get("weight").map(String::as_str),
            Some("10")
        );
    }

    #[test]
    fn absent_native_list_converts_to_empty() {
        assert!(convert_instances(None).is_empty());
        assert!(convert_instances(Some(Vec::new())).is_empty());
    }

    #[tokio::test]
    async fn list_instances_fetches_converts_and_marks_ready() {
        let ctx = context_with_client(HashMap::from([(
            "orders".to_owned(),
            Some(vec![native_instance()]),
        )]));

        let instances = ctx.list_instances("orders").await.unwrap();

        assert_eq!(instances.len(), 1);
        assert!(instances[0].is_ready());
    }

    #[tokio::test]
    async fn unknown_service_yields_empty_not_error() {
        let ctx = context_with_client(HashMap::new());
        assert!(ctx.list_instances("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_discovery_answers_empty() {
        let hub = Arc::new(DependencyHub::new());
        let integrations = vec![RegistryIntegration::new("consul", || false)];
        let ctx = RegistryServerContext::new(hub, integrations, DiscoveryConfig::default());

        assert!(!ctx.is_discovery_enabled());
        assert!(ctx.list_service_names().await.unwrap().is_empty());
        assert!(ctx.list_instances("orders").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn config_flag_blocks_an_available_integration() {
        let mut config = DiscoveryConfig::default();
        config
            .integrations
            .insert("consul".to_owned(), crate::config::IntegrationConfig {
                enabled: false,
            });

        let ctx = RegistryServerContext::new(Arc::new(DependencyHub::new()), always_on(), config);

        assert!(!ctx.is_discovery_enabled());
    }

    #[tokio::test]
    async fn enablement_latch_is_monotonic() {
        let ctx = context_with_client(HashMap::new());
        assert!(ctx.is_discovery_enabled());

        // Flip the configuration off afterwards: the latch must hold.
        let mut disabled = DiscoveryConfig::default();
        disabled
            .integrations
            .insert("consul".to_owned(), crate::config::IntegrationConfig {
                enabled: false,
            });
        ctx.update_config(disabled);

        assert!(ctx.is_discovery_enabled(), "latch never reverts to false");
    }

    #[tokio::test]
    async fn missing_client_is_fatal_and_latched() {
        let hub = Arc::new(DependencyHub::new());
        let ctx = RegistryServerContext::new(
            hub.clone(),
            always_on(),
            DiscoveryConfig::default(),
        );

        assert!(matches!(
            ctx.list_instances("orders").await,
            Err(DiscoveryError::DependencyMissing { .. })
        ));

        // Registering the client later does not revive the context:
        // resolution is not retried.
        hub.register::<dyn RegistryClient>(Arc::new(FakeRegistry {
            services: HashMap::new(),
        }));
        assert!(matches!(
            ctx.list_instances("orders").await,
            Err(DiscoveryError::DependencyMissing { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_first_callers_observe_one_resolution() {
        let ctx = Arc::new(context_with_client(HashMap::new()));

        let clients = futures::future::join_all((0..16).map(|_| {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.client().unwrap() })
        }))
        .await;

        let first = clients[0].as_ref().unwrap();
        for client in &clients {
            let client = client.as_ref().unwrap();
            assert!(
                Arc::ptr_eq(first, client),
                "all callers must observe the same resolved client"
            );
        }
    }
}
