//! Concurrent publish/subscribe registry used to decouple discovery refresh
//! and command-configuration changes from the subsystems that react to them
//! (load balancer pools, circuit breaker state, metrics).
//!
//! Design notes:
//! - The payload type is a generic parameter fixed per bus instance, so each
//!   publisher owns a bus with a statically checked payload instead of a
//!   per-key dynamic convention.
//! - A bus is an explicitly constructed value injected into the components
//!   that publish through it, never a process-wide static. Its lifetime must
//!   bound the lifetime of its subscribers: entries are never evicted, so
//!   registering short-lived callbacks against a long-lived bus accumulates
//!   dead entries.
//! - `emit` snapshots the subscriber list before invoking anything, so a
//!   concurrent (or re-entrant) `subscribe` observes either the pre- or the
//!   post-append state and can never corrupt iteration.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use dashmap::DashMap;

/// Callback registered under an event key.
///
/// Failures are isolated per callback: an `Err` (or a panic) is logged and
/// does not abort delivery to the remaining subscribers, nor does it reach
/// the emitter's caller.
pub type Subscriber<P> = Arc<dyn Fn(&P) -> anyhow::Result<()> + Send + Sync>;

/// Event bus mapping an event key to an ordered list of subscribers.
///
/// Safe for concurrent `subscribe` and `emit` from independent threads.
/// Within one key, registration order determines emission order.
pub struct EventBus<P> {
    subscribers: DashMap<String, Vec<Subscriber<P>>>,
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> EventBus<P> {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Register `subscriber` under `key`.
    ///
    /// Multiple subscribers may share a key; none is lost under concurrent
    /// registration. The bus never evicts entries, so callers must not
    /// register callbacks that outlive their usefulness (see module docs).
    pub fn subscribe<F>(&self, key: impl Into<String>, subscriber: F)
    where
        F: Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let key = key.into();
        self.subscribers
            .entry(key.clone())
            .or_default()
            .push(Arc::new(subscriber));
        tracing::trace!(event = %key, "subscriber registered");
    }

    /// Invoke every subscriber currently registered under `key`, in
    /// registration order, synchronously on the caller's thread.
    ///
    /// Emitting on a key with no subscribers is a no-op. Returns the number
    /// of subscribers invoked (including failed ones).
    pub fn emit(&self, key: &str, payload: &P) -> usize {
        // Snapshot under the shard guard, invoke outside of it: a callback
        // is free to subscribe or emit again without deadlocking.
        let snapshot: Vec<Subscriber<P>> = match self.subscribers.get(key) {
            Some(list) => list.clone(),
            None => return 0,
        };

        for (idx, subscriber) in snapshot.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| subscriber(payload))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::error!(event = %key, subscriber = idx, error = %error,
                        "subscriber failed; continuing delivery");
                }
                Err(_) => {
                    tracing::error!(event = %key, subscriber = idx,
                        "subscriber panicked; continuing delivery");
                }
            }
        }
        tracing::trace!(event = %key, delivered = snapshot.len(), "event emitted");
        snapshot.len()
    }

    /// Number of subscribers currently registered under `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.subscribers.get(key).map_or(0, |list| list.len())
    }
}
