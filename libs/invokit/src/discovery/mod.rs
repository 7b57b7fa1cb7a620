//! Service discovery abstraction: one polymorphic [`ServerContext`] contract
//! over a closed set of source variants, a canonical readiness-gated
//! [`ServerInstance`] model, and a cached view that publishes change events.

mod cache;
mod context;
mod instance;
mod registry;
mod static_list;

pub use cache::{CachedServerContext, ServerListUpdate};
pub use context::{DiscoveryError, ServerContext};
pub use instance::ServerInstance;
pub use registry::{
    RegistryClient, RegistryInstance, RegistryIntegration, RegistryServerContext,
};
pub use static_list::{StaticEndpoint, StaticServerContext};
