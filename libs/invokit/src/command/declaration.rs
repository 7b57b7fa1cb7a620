//! Raw declarative attributes for one service, as supplied by the external
//! configuration source. The assembler treats this as an opaque read-only
//! record; it does not parse files or flags itself.

use serde::{Deserialize, Serialize};

/// Declared service-call policy, prior to validation.
///
/// All fields carry serde defaults so a declaration can be as sparse as a
/// service name; validation happens in [`crate::command::assemble`], not here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDeclaration {
    /// Logical name of the target service. Required, non-empty.
    pub service_name: String,

    /// Retry attempts on failure. Must be non-negative; zero disables retry.
    /// Declared as signed so an invalid negative value can be rejected with
    /// a proper error instead of a deserialization artifact.
    pub retry: i32,

    /// Whether fallback is enabled for this service.
    pub fallback_enabled: bool,
    /// Type reference of the fallback handler (always copied).
    pub fallback_handler: String,
    /// Named fallback handler registered in the dependency hub; an empty
    /// value means "keep whatever default is already resolved".
    pub fallback_ref: String,

    /// Whether the circuit breaker is enabled.
    pub circuit_break_enabled: bool,
    /// Forcing the break unconditionally enables circuit breaking,
    /// regardless of `circuit_break_enabled`.
    pub force_break_enabled: bool,

    /// Opaque load balancer strategy id, interpreted by the selection layer.
    pub load_balancer: String,

    /// Permits per unit time; zero or absent means unlimited.
    pub limit: f64,

    /// Ordered version-matching expressions; blank entries are skipped.
    pub versions: Vec<String>,
}
