pub mod factory;
pub mod key_value;
pub mod memory;

pub use factory::{MemoryStorageFactory, StorageConfig, StorageFactory, StorageRegistry};
pub use key_value::{KeyValueStore, StorageError};
pub use memory::MemoryStorage;
