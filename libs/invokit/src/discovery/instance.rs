//! Canonical description of one discovered service endpoint.

use std::collections::HashMap;

/// One network-addressable endpoint implementing a logical service.
///
/// Readiness is a one-way transition: an instance becomes ready via
/// [`ServerInstance::mark_ready`] once host and port are populated, and no
/// API un-readies it. A stale instance is replaced on the next refresh,
/// never reverted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerInstance {
    service_name: String,
    host: String,
    port: u16,
    secure: bool,
    metadata: HashMap<String, String>,
    ready: bool,
}

impl ServerInstance {
    /// Build a not-yet-ready instance. Converters populate metadata and call
    /// [`mark_ready`](Self::mark_ready) last, so callers never observe a
    /// half-populated ready instance.
    pub fn new(
        service_name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        secure: bool,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            host: host.into(),
            port,
            secure,
            metadata: HashMap::new(),
            ready: false,
        }
    }

    /// Insert one metadata tag. Later writes on the same key overwrite.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Copy all backend-supplied tags into the metadata mapping.
    pub fn extend_metadata<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.metadata.insert(key.into(), value.into());
        }
    }

    /// Mark the instance safe to route traffic to. One-way: once ready,
    /// an instance never reverts within its lifetime.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[inline]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    #[inline]
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }
}
