pub mod memory;
pub mod store;
pub mod types;

pub use memory::{MemoryKvIterator, MemoryKvStore};
pub use store::{validate_key, KvIterator, KvStore, KvStoreError, KvStoreResult};
pub use types::{GetOptions, IteratorOptions, Key, Operation, PutOptions, ReadAs, Value};
