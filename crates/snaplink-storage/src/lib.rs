pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use snaplink_core::store::{Result, SnapshotStore};
pub use snaplink_core::StorageError;
