//! Client-side runtime support for a resilient RPC invocation framework.
//!
//! Three concerns live here:
//!
//! - [`discovery`]: one polymorphic [`discovery::ServerContext`] contract
//!   over the discovery source variants (static list, pluggable registry),
//!   converting native backend records into canonical, readiness-gated
//!   [`discovery::ServerInstance`]s, with a cached view that refreshes on
//!   demand or on a schedule.
//! - [`command`]: validation and compilation of declarative per-service
//!   policy ([`command::ServiceDeclaration`]) into the immutable
//!   [`command::CommandConfig`] consumed by the call-execution path.
//! - [`events`]: a lightweight concurrent publish/subscribe bus through
//!   which both of the above announce state changes to dependent subsystems
//!   (load balancer pools, circuit breaker state, metrics) without tight
//!   coupling.
//!
//! Transport, wire encoding, circuit breaker internals, and load balancer
//! selection are consumers of this crate's outputs, not part of it.

pub mod command;
pub mod config;
pub mod discovery;
pub mod events;
pub mod hub;

pub use command::{
    CommandConfig, CommandConfigRegistry, CommandConfigUpdate, ConfigurationError,
    ServiceDeclaration, VersionRule, assemble,
};
pub use config::{DiscoveryConfig, IntegrationConfig, InvokitConfig};
pub use discovery::{
    CachedServerContext, DiscoveryError, RegistryClient, RegistryInstance, RegistryIntegration,
    RegistryServerContext, ServerContext, ServerInstance, ServerListUpdate, StaticEndpoint,
    StaticServerContext,
};
pub use events::EventBus;
pub use hub::{DependencyHub, HubError};
