//! The polymorphic discovery contract and its error taxonomy.

use async_trait::async_trait;

use super::instance::ServerInstance;

/// Discovery failed in a way callers cannot paper over.
///
/// Empty or partial result sets are data, not errors: a service with no
/// ready instances yields `Ok(vec![])`, distinct from a hard dependency
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The registry client could not be resolved from the dependency hub.
    /// Fatal for the owning context: resolution is not retried, since it is
    /// unlikely to succeed without external intervention.
    #[error("registry client '{client_type}' could not be resolved from the dependency hub")]
    DependencyMissing { client_type: &'static str },

    /// The backend client reported a failure while answering a query.
    #[error("registry backend failure: {source}")]
    Backend {
        #[source]
        source: anyhow::Error,
    },
}

/// Addressable view of "which instances currently exist for service X",
/// exposed polymorphically over the discovery source variants
/// (static list, pluggable registry).
#[async_trait]
pub trait ServerContext: Send + Sync {
    /// Whether this context can answer discovery queries at all.
    /// Re-checkable at any time; reflects environment and configuration
    /// state, not a one-time decision.
    fn is_discovery_enabled(&self) -> bool;

    /// All service names the backend currently knows. Empty when discovery
    /// is disabled or the backend reports none.
    ///
    /// # Errors
    /// [`DiscoveryError`] when the backend client is missing or fails.
    async fn list_service_names(&self) -> Result<Vec<String>, DiscoveryError>;

    /// Fetch, convert, and mark ready the current instance set for one
    /// service. An empty vec is a valid non-error result. Two sequential
    /// calls may observe different results; callers needing a consistent
    /// view must capture one returned vec and reuse it.
    ///
    /// # Errors
    /// [`DiscoveryError`] when the backend client is missing or fails.
    async fn list_instances(
        &self,
        service_name: &str,
    ) -> Result<Vec<ServerInstance>, DiscoveryError>;
}
