//! The compiled, immutable per-service invocation policy.

/// Constraint pairing a service name with a version-matching expression,
/// used by the routing layer to filter candidate instances by declared
/// version metadata. Created only from non-blank expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionRule {
    service_name: String,
    expression: String,
}

impl VersionRule {
    pub(crate) fn new(service_name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            expression: expression.into(),
        }
    }

    #[inline]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    #[inline]
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// Compiled invocation policy for one service.
///
/// Immutable by construction: the only way to obtain one is
/// [`crate::command::assemble`], fields are private, and no mutating API
/// exists. Re-declaring a service produces a new instance that supersedes
/// the old one in [`crate::command::CommandConfigRegistry`].
#[derive(Clone, Debug, PartialEq)]
pub struct CommandConfig {
    pub(crate) service_name: String,
    pub(crate) retry: u32,
    pub(crate) fallback_enabled: bool,
    pub(crate) fallback_handler: String,
    pub(crate) fallback_ref: Option<String>,
    pub(crate) circuit_break_enabled: bool,
    pub(crate) force_break_enabled: bool,
    pub(crate) load_balancer: String,
    pub(crate) limit: f64,
    pub(crate) version_rules: Vec<VersionRule>,
}

impl CommandConfig {
    #[inline]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Retry attempts; zero means retry is disabled.
    #[inline]
    pub fn retry(&self) -> u32 {
        self.retry
    }

    #[inline]
    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    /// Type reference of the fallback handler.
    #[inline]
    pub fn fallback_handler(&self) -> &str {
        &self.fallback_handler
    }

    /// Named fallback handler reference, if the declaration supplied one.
    #[inline]
    pub fn fallback_ref(&self) -> Option<&str> {
        self.fallback_ref.as_deref()
    }

    #[inline]
    pub fn circuit_break_enabled(&self) -> bool {
        self.circuit_break_enabled
    }

    #[inline]
    pub fn force_break_enabled(&self) -> bool {
        self.force_break_enabled
    }

    /// Opaque load balancer strategy id.
    #[inline]
    pub fn load_balancer(&self) -> &str {
        &self.load_balancer
    }

    /// Permits per unit time; zero means unlimited.
    #[inline]
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Version routing rules. An empty slice means "match any version".
    #[inline]
    pub fn version_rules(&self) -> &[VersionRule] {
        &self.version_rules
    }
}
