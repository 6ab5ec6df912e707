pub mod blob;
pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};
pub use store::{ChangeHandler, PrefUpdate, PreferenceStore};
