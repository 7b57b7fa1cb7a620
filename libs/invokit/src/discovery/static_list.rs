//! Static/manual discovery variant: the instance set comes straight from
//! configuration instead of a registry.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::context::{DiscoveryError, ServerContext};
use super::instance::ServerInstance;

/// One configured endpoint of a statically declared service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticEndpoint {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Discovery context backed by a fixed, configured service map.
///
/// Always enabled: a static list can answer queries by definition.
pub struct StaticServerContext {
    services: HashMap<String, Vec<StaticEndpoint>>,
}

impl StaticServerContext {
    pub fn new(services: HashMap<String, Vec<StaticEndpoint>>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ServerContext for StaticServerContext {
    fn is_discovery_enabled(&self) -> bool {
        true
    }

    async fn list_service_names(&self) -> Result<Vec<String>, DiscoveryError> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }

    async fn list_instances(
        &self,
        service_name: &str,
    ) -> Result<Vec<ServerInstance>, DiscoveryError> {
        let endpoints = match self.services.get(service_name) {
            Some(endpoints) => endpoints,
            None => return Ok(Vec::new()),
        };

        let instances = endpoints
            .iter()
            .map(|endpoint| {
                let mut instance = ServerInstance::new(
                    service_name,
                    endpoint.host.clone(),
                    endpoint.port,
                    endpoint.secure,
                );
                instance.extend_metadata(
                    endpoint
                        .metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone())),
                );
                instance.mark_ready();
                instance
            })
            .collect();
        Ok(instances)
    }
}
