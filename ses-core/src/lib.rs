pub mod calculations;
pub mod format;
pub mod input;
pub mod models;
pub mod storage;
pub mod store;

pub use calculations::{CaseRow, Totals, compute_row, compute_totals};
pub use models::*;
pub use storage::{KeyValueStore, StorageError};
pub use store::{CaseStore, DEFAULT_STORAGE_KEY};
