//! Type-keyed registry of shared collaborators.
//!
//! The hub is the in-process dependency resolution container this crate
//! expects its embedder to populate: the pluggable registry client, named
//! fallback handlers, and similar collaborators are registered once under
//! their interface type and resolved on demand.
//!
//! - Key = fully-qualified `type_name::<T>()`, which works for trait objects
//!   (`T = dyn RegistryClient`).
//! - Value = `Arc<T>` stored as `Box<dyn Any + Send + Sync>`, downcast on read.
//! - Re-registering overwrites the previous entry atomically; `Arc`s already
//!   held by consumers remain valid.
//! - `remove` and `clear` exist mainly for tests.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// Stable key for a registered interface type.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct TypeKey(&'static str);

impl TypeKey {
    #[inline]
    fn of<T: ?Sized + 'static>() -> Self {
        TypeKey(std::any::type_name::<T>())
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("no collaborator registered for type {type_key:?}")]
    NotFound { type_key: TypeKey },

    #[error("stored collaborator has the wrong type for {type_key:?}")]
    TypeMismatch { type_key: TypeKey },
}

type Boxed = Box<dyn Any + Send + Sync>;

/// Dependency resolution container keyed by interface type.
pub struct DependencyHub {
    entries: RwLock<HashMap<TypeKey, Boxed>>,
}

impl Default for DependencyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyHub {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a collaborator under the interface type `T`.
    /// `T` may be a trait object like `dyn RegistryClient`.
    pub fn register<T>(&self, value: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        self.entries.write().insert(key, Box::new(value));
        tracing::trace!(type_name = key.name(), "collaborator registered");
    }

    /// Resolve a collaborator by interface type `T`.
    ///
    /// # Errors
    /// `HubError::NotFound` when nothing is registered under `T`;
    /// `HubError::TypeMismatch` when the stored value cannot be downcast
    /// (only possible via a type-name collision, which in practice means a
    /// programming error).
    pub fn get<T>(&self) -> Result<Arc<T>, HubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        let entries = self.entries.read();
        let boxed = entries
            .get(&key)
            .ok_or(HubError::NotFound { type_key: key })?;
        boxed
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(HubError::TypeMismatch { type_key: key })
    }

    /// Whether a collaborator is registered under `T`.
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries.read().contains_key(&TypeKey::of::<T>())
    }

    /// Remove the collaborator registered under `T`, returning it if present.
    pub fn remove<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let boxed = self.entries.write().remove(&TypeKey::of::<T>())?;
        boxed.downcast::<Arc<T>>().ok().map(|b| *b)
    }

    /// Drop every entry (test helper).
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    impl std::fmt::Debug for dyn Greeter {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("dyn Greeter")
        }
    }

    struct English;
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_owned()
        }
    }

    struct French;
    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".to_owned()
        }
    }

    #[test]
    fn register_and_resolve_trait_object() {
        let hub = DependencyHub::new();
        let greeter: Arc<dyn Greeter> = Arc::new(English);
        hub.register::<dyn Greeter>(greeter.clone());

        let resolved = hub.get::<dyn Greeter>().unwrap();
        assert_eq!(resolved.greet(), "hello");
        assert!(Arc::ptr_eq(&greeter, &resolved));
    }

    #[test]
    fn missing_collaborator_reports_not_found() {
        let hub = DependencyHub::new();
        match hub.get::<dyn Greeter>() {
            Err(HubError::NotFound { type_key }) => {
                assert!(type_key.name().contains("Greeter"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn re_registration_overwrites_but_existing_arcs_stay_valid() {
        let hub = DependencyHub::new();
        hub.register::<dyn Greeter>(Arc::new(English));
        let first = hub.get::<dyn Greeter>().unwrap();

        hub.register::<dyn Greeter>(Arc::new(French));

        assert_eq!(first.greet(), "hello", "held Arc keeps the old value");
        assert_eq!(hub.get::<dyn Greeter>().unwrap().greet(), "bonjour");
    }

    #[test]
    fn remove_makes_collaborator_unresolvable() {
        let hub = DependencyHub::new();
        hub.register::<dyn Greeter>(Arc::new(English));

        let removed = hub.remove::<dyn Greeter>();
        assert!(removed.is_some());
        assert!(hub.get::<dyn Greeter>().is_err());
        assert!(hub.is_empty());
    }

    #[test]
    fn distinct_types_coexist() {
        trait Other: Send + Sync {}
        struct O;
        impl Other for O {}

        let hub = DependencyHub::new();
        hub.register::<dyn Greeter>(Arc::new(English));
        hub.register::<dyn Other>(Arc::new(O));

        assert_eq!(hub.len(), 2);
        assert!(hub.contains::<dyn Greeter>());
        assert!(hub.contains::<dyn Other>());
    }

    #[test]
    fn concurrent_register_and_get_are_safe() {
        let hub = Arc::new(DependencyHub::new());
        hub.register::<dyn Greeter>(Arc::new(English));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let hub = hub.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        hub.register::<dyn Greeter>(Arc::new(English));
                        hub.get::<dyn Greeter>().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(hub.get::<dyn Greeter>().is_ok());
    }
}
