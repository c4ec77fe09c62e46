use async_trait::async_trait;

use ses_core::storage::{KeyValueStore, StorageConfig, StorageError, StorageFactory};

use crate::storage::SqliteStorage;

/// [`StorageFactory`] for SQLite.
///
/// Register this with a [`ses_core::storage::StorageRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use ses_core::storage::StorageRegistry;
/// use ses_db_sqlite::SqliteStorageFactory;
///
/// let mut registry = StorageRegistry::new();
/// registry.register(Box::new(SqliteStorageFactory));
/// ```
pub struct SqliteStorageFactory;

#[async_trait]
impl StorageFactory for SqliteStorageFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"ses-calc.db"`.  The file is created if it
    ///   does not exist.
    /// * A `sqlite:` URL.
    /// * `":memory:"`, an ephemeral in-memory database (useful for tests).
    async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Box<dyn KeyValueStore>, StorageError> {
        let storage = SqliteStorage::new(&config.connection_string).await?;
        storage.run_migrations().await?;
        Ok(Box::new(storage))
    }
}
