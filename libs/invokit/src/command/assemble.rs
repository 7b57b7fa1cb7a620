//! Validation and compilation of a [`ServiceDeclaration`] into an immutable
//! [`CommandConfig`].

use super::config::{CommandConfig, VersionRule};
use super::declaration::ServiceDeclaration;

/// A declared service-call configuration violates an invariant.
///
/// Raised synchronously during assembly; fatal to that one registration,
/// never partially applied.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("service name must not be empty")]
    EmptyServiceName,

    #[error("retry must be non-negative, got {retry}")]
    NegativeRetry { retry: i32 },
}

/// Compile `declaration` into a [`CommandConfig`].
///
/// Total and deterministic for a given declaration; always produces a new
/// value, never mutates an existing config in place.
///
/// Mapping rules:
/// - the fallback handler type reference is always copied, but the named
///   reference is set only when the declaration supplies a non-empty value
///   (an empty value must not overwrite the unset default);
/// - `force_break_enabled` is a hard override: it sets circuit breaking on
///   regardless of the declared flag. It deliberately does not touch the
///   fallback flag;
/// - blank version expressions are skipped, and an all-blank list leaves the
///   rules at their empty "match any version" default;
/// - load balancer id and limit are copied without validation, they are
///   opaque to this layer.
///
/// # Errors
/// One [`ConfigurationError`] naming the offending field; no partial config
/// is ever returned.
pub fn assemble(declaration: &ServiceDeclaration) -> Result<CommandConfig, ConfigurationError> {
    let service_name = declaration.service_name.trim();
    if service_name.is_empty() {
        return Err(ConfigurationError::EmptyServiceName);
    }

    let retry = u32::try_from(declaration.retry)
        .map_err(|_| ConfigurationError::NegativeRetry {
            retry: declaration.retry,
        })?;

    let fallback_ref = if declaration.fallback_ref.is_empty() {
        None
    } else {
        Some(declaration.fallback_ref.clone())
    };

    // Force-break wins over the declared circuit-break flag.
    let (circuit_break_enabled, force_break_enabled) = if declaration.force_break_enabled {
        (true, true)
    } else {
        (declaration.circuit_break_enabled, false)
    };

    let version_rules: Vec<VersionRule> = declaration
        .versions
        .iter()
        .filter(|expression| !expression.trim().is_empty())
        .map(|expression| VersionRule::new(service_name, expression.clone()))
        .collect();

    Ok(CommandConfig {
        service_name: service_name.to_owned(),
        retry,
        fallback_enabled: declaration.fallback_enabled,
        fallback_handler: declaration.fallback_handler.clone(),
        fallback_ref,
        circuit_break_enabled,
        force_break_enabled,
        load_balancer: declaration.load_balancer.clone(),
        limit: declaration.limit,
        version_rules,
    })
}
