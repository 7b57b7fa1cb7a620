//! Cached view over a discovery source, refreshed on demand or on a
//! schedule, publishing change events for dependent subsystems.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use super::context::{DiscoveryError, ServerContext};
use super::instance::ServerInstance;
use crate::events::EventBus;

/// Payload emitted on the discovery bus, keyed by service name.
#[derive(Clone, Debug)]
pub struct ServerListUpdate {
    pub service_name: String,
    pub instances: Arc<Vec<ServerInstance>>,
}

/// Per-service cache of ready instances over an inner [`ServerContext`].
///
/// A refresh replaces the cached list wholesale: instances absent from the
/// new backend response are evicted, never un-readied. No snapshot isolation
/// exists across calls; callers needing a consistent view capture one
/// returned `Arc` and reuse it.
pub struct CachedServerContext {
    inner: Arc<dyn ServerContext>,
    cache: DashMap<String, Arc<Vec<ServerInstance>>>,
    bus: Arc<EventBus<ServerListUpdate>>,
}

impl CachedServerContext {
    pub fn new(inner: Arc<dyn ServerContext>, bus: Arc<EventBus<ServerListUpdate>>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            bus,
        }
    }

    /// Last refreshed instance list for `service_name`, if any.
    pub fn cached_instances(&self, service_name: &str) -> Option<Arc<Vec<ServerInstance>>> {
        self.cache.get(service_name).map(|entry| entry.clone())
    }

    /// Fetch through to the inner context, replace the cache entry, and emit
    /// a [`ServerListUpdate`] under the service-name key when the list
    /// actually changed.
    ///
    /// # Errors
    /// Propagates the inner context's [`DiscoveryError`]; the cached entry
    /// is left untouched on failure.
    pub async fn refresh(
        &self,
        service_name: &str,
    ) -> Result<Arc<Vec<ServerInstance>>, DiscoveryError> {
        let fresh = Arc::new(self.inner.list_instances(service_name).await?);

        let changed = self
            .cache
            .insert(service_name.to_owned(), fresh.clone())
            .is_none_or(|previous| *previous != *fresh);

        if changed {
            tracing::debug!(service = service_name, instances = fresh.len(),
                "server list changed");
            self.bus.emit(
                service_name,
                &ServerListUpdate {
                    service_name: service_name.to_owned(),
                    instances: fresh.clone(),
                },
            );
        }
        Ok(fresh)
    }

    /// Refresh every service the backend currently reports.
    ///
    /// # Errors
    /// Fails on the first backend error; already-refreshed services keep
    /// their new lists.
    pub async fn refresh_all(&self) -> Result<(), DiscoveryError> {
        for service_name in self.inner.list_service_names().await? {
            self.refresh(&service_name).await?;
        }
        Ok(())
    }

    /// Run the scheduled refresh until `cancel` fires. Backend errors are
    /// logged and the schedule continues; discovery outages are transient
    /// from the cache's point of view.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(error) = cache.refresh_all().await {
                            tracing::warn!(error = %error, "scheduled discovery refresh failed");
                        }
                    }
                    () = cancel.cancelled() => {
                        tracing::debug!("discovery refresh task stopping");
                        break;
                    }
                }
            }
        })
    }

    pub fn bus(&self) -> &Arc<EventBus<ServerListUpdate>> {
        &self.bus
    }
}

#[async_trait]
impl ServerContext for CachedServerContext {
    fn is_discovery_enabled(&self) -> bool {
        self.inner.is_discovery_enabled()
    }

    async fn list_service_names(&self) -> Result<Vec<String>, DiscoveryError> {
        self.inner.list_service_names().await
    }

    /// Fetch-through: refreshes the cache and returns the fresh list.
    async fn list_instances(
        &self,
        service_name: &str,
    ) -> Result<Vec<ServerInstance>, DiscoveryError> {
        Ok(self.refresh(service_name).await?.as_ref().clone())
    }
}
