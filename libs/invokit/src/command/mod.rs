//! Per-service invocation policy: declarative input, validation, and the
//! compiled immutable descriptor consumed by the call-execution path.

mod assemble;
mod config;
mod declaration;
mod registry;

pub use assemble::{ConfigurationError, assemble};
pub use config::{CommandConfig, VersionRule};
pub use declaration::ServiceDeclaration;
pub use registry::{CommandConfigRegistry, CommandConfigUpdate};
