use std::collections::HashMap;

use async_trait::async_trait;

use super::key_value::{KeyValueStore, StorageError};
use super::memory::MemoryStorage;

/// Backend-agnostic storage configuration.
///
/// `backend` must match the [`StorageFactory::backend_name`] of a
/// registered factory.  `connection_string` is passed through to that
/// factory unchanged; its meaning is entirely backend-specific.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `memory`   | ignored                             |
/// | `sqlite`   | `ses-calc.db`, `:memory:`           |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "ses-calc.db".to_string(),
        }
    }
}

/// One implementation per storage backend.  Each backend crate exports a
/// single unit struct that implements this trait and is registered with a
/// [`StorageRegistry`] at startup.
#[async_trait]
pub trait StorageFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the store and return it ready for use.
    async fn create(&self, config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, StorageError>;
}

/// Factory for [`MemoryStorage`]. Every `create` call yields a fresh, empty
/// store.
pub struct MemoryStorageFactory;

#[async_trait]
impl StorageFactory for MemoryStorageFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, _config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, StorageError> {
        Ok(Box::new(MemoryStorage::new()))
    }
}

/// Registry of [`StorageFactory`] instances, keyed by backend name.
///
/// Typical lifetime:
/// 1. Create with `StorageRegistry::new()`.
/// 2. Call `register` once per known backend.
/// 3. Call `create` whenever a store is needed.
pub struct StorageRegistry {
    factories: HashMap<&'static str, Box<dyn StorageFactory>>,
}

impl StorageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory.
    ///
    /// If a factory with the same [`StorageFactory::backend_name`] is
    /// already present it is silently replaced.
    pub fn register(&mut self, factory: Box<dyn StorageFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend` and return
    /// the store it produces.
    ///
    /// # Errors
    /// * [`StorageError::Configuration`] if no factory is registered for
    ///   the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Box<dyn KeyValueStore>, StorageError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                StorageError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        tracing::debug!(backend = %config.backend, "opening storage backend");
        factory.create(config).await
    }
}

impl Default for StorageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::{
        KeyValueStore, MemoryStorageFactory, StorageConfig, StorageError, StorageFactory,
        StorageRegistry,
    };
    use crate::storage::MemoryStorage;

    // ── stub factory ─────────────────────────────────────────────────────
    /// A factory whose `create` flips an `AtomicBool` and returns an empty
    /// [`MemoryStorage`].  The flag lets tests prove that `create` was
    /// actually called.
    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl StorageFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &StorageConfig,
        ) -> Result<Box<dyn KeyValueStore>, StorageError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(MemoryStorage::new()))
        }
    }

    /// A factory that always returns a `Connection` error.
    struct FailingFactory;

    #[async_trait]
    impl StorageFactory for FailingFactory {
        fn backend_name(&self) -> &'static str {
            "failing"
        }
        async fn create(
            &self,
            _config: &StorageConfig,
        ) -> Result<Box<dyn KeyValueStore>, StorageError> {
            Err(StorageError::Connection("intentional failure".to_string()))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn StorageFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    fn config(backend: &str) -> StorageConfig {
        StorageConfig {
            backend: backend.to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    // ── StorageConfig ────────────────────────────────────────────────────
    #[test]
    fn storage_config_default_is_sqlite_file() {
        let cfg = StorageConfig::default();
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, "ses-calc.db");
    }

    // ── registration ─────────────────────────────────────────────────────
    #[test]
    fn new_registry_has_no_backends() {
        assert!(StorageRegistry::new().available_backends().is_empty());
    }

    #[test]
    fn available_backends_is_sorted() {
        let mut reg = StorageRegistry::new();
        let (f1, _) = stub_factory("sqlite");
        let (f2, _) = stub_factory("memory");
        reg.register(f1);
        reg.register(f2);
        assert_eq!(reg.available_backends(), vec!["memory", "sqlite"]);
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = StorageRegistry::new();
        let (old, _) = stub_factory("sqlite");
        let (new, _) = stub_factory("sqlite");
        reg.register(old);
        reg.register(new);
        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    // ── dispatch ─────────────────────────────────────────────────────────
    #[tokio::test]
    async fn create_calls_matching_factory_only() {
        let mut reg = StorageRegistry::new();
        let (sqlite_factory, sqlite_called) = stub_factory("sqlite");
        let (other_factory, other_called) = stub_factory("other");
        reg.register(sqlite_factory);
        reg.register(other_factory);

        let result = reg.create(&config("sqlite")).await;

        assert!(result.is_ok(), "expected Ok, got {:#?}", result.err());
        assert!(sqlite_called.load(Ordering::SeqCst));
        assert!(!other_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn create_unknown_backend_is_configuration_error() {
        let mut reg = StorageRegistry::new();
        let (factory, _) = stub_factory("sqlite");
        reg.register(factory);

        let err = reg.create(&config("postgres")).await.err().unwrap();

        match err {
            StorageError::Configuration(msg) => {
                assert!(msg.contains("postgres"), "message: {msg}");
                assert!(msg.contains("sqlite"), "message: {msg}");
            }
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_surfaces_factory_errors() {
        let mut reg = StorageRegistry::new();
        reg.register(Box::new(FailingFactory));

        let err = reg.create(&config("failing")).await.err().unwrap();

        assert!(matches!(err, StorageError::Connection(_)));
    }

    #[tokio::test]
    async fn memory_factory_creates_empty_store() {
        let mut reg = StorageRegistry::new();
        reg.register(Box::new(MemoryStorageFactory));

        let store = reg.create(&config("memory")).await.unwrap();

        assert_eq!(store.get("anything").await.unwrap(), None);
    }
}
