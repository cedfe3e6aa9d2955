use crate::store::{validate_key, KvIterator, KvStore, KvStoreError, KvStoreResult};
use crate::types::{GetOptions, IteratorOptions, Key, Operation, PutOptions, ReadAs, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
struct MemoryState {
    entries: BTreeMap<Key, StoredEntry>,
}

#[derive(Clone, Debug)]
struct StoredEntry {
    raw: Vec<u8>,
    metadata: Option<JsonValue>,
}

/// In-memory implementer of the storage contract, used as the
/// substitution fake in tests of code written against [`KvStore`].
///
/// Unlike a remote adapter it needs no bulk credentials: `batch` applies
/// its operations in order under one lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryKvStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata recorded with the most recent `put` of `key`, if any.
    pub fn metadata(&self, key: &str) -> Option<JsonValue> {
        let state = self.inner.lock().expect("memory kv store mutex poisoned");
        state.entries.get(key).and_then(|entry| entry.metadata.clone())
    }

    pub fn len(&self) -> usize {
        let state = self.inner.lock().expect("memory kv store mutex poisoned");
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> KvStoreResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| KvStoreError::transport("memory kv store mutex poisoned"))
    }
}

fn materialize(key: &str, entry: &StoredEntry, read_as: ReadAs) -> KvStoreResult<Value> {
    match read_as {
        ReadAs::Bytes => Ok(Value::Bytes(entry.raw.clone())),
        ReadAs::Text => String::from_utf8(entry.raw.clone()).map(Value::Text).map_err(|_| {
            KvStoreError::InvalidInput(format!("value for key {key:?} is not valid UTF-8 text"))
        }),
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryKvStore {
    async fn open(&self) -> KvStoreResult<()> {
        Ok(())
    }

    async fn close(&self) -> KvStoreResult<()> {
        Ok(())
    }

    async fn get(&self, key: &str, options: GetOptions) -> KvStoreResult<Value> {
        validate_key(key)?;
        let state = self.lock()?;
        let entry = state
            .entries
            .get(key)
            .ok_or_else(|| KvStoreError::NotFound(key.to_string()))?;
        materialize(key, entry, options.read_as)
    }

    async fn put(&self, key: &str, value: Value, options: PutOptions) -> KvStoreResult<()> {
        validate_key(key)?;
        let mut state = self.lock()?;
        state.entries.insert(
            key.to_string(),
            StoredEntry {
                raw: value.as_bytes().to_vec(),
                metadata: options.metadata,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvStoreResult<()> {
        validate_key(key)?;
        let mut state = self.lock()?;
        state.entries.remove(key);
        Ok(())
    }

    async fn batch(&self, operations: Vec<Operation>) -> KvStoreResult<()> {
        for operation in &operations {
            validate_key(operation.key())?;
        }

        let mut state = self.lock()?;
        for operation in operations {
            match operation {
                Operation::Put { key, value } => {
                    state.entries.insert(
                        key,
                        StoredEntry {
                            raw: value.as_bytes().to_vec(),
                            metadata: None,
                        },
                    );
                }
                Operation::Delete { key } => {
                    state.entries.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn iterator(&self, options: IteratorOptions) -> Box<dyn KvIterator> {
        let state = self.inner.lock().expect("memory kv store mutex poisoned");
        let mut snapshot: Vec<(Key, Vec<u8>)> = state
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.raw.clone()))
            .collect();
        if options.reverse {
            snapshot.reverse();
        }
        if let Some(limit) = options.limit {
            snapshot.truncate(limit);
        }
        Box::new(MemoryKvIterator {
            reverse: options.reverse,
            snapshot,
            cursor: 0,
            ended: false,
        })
    }
}

/// Snapshot iterator over the entries present at creation time.
pub struct MemoryKvIterator {
    reverse: bool,
    snapshot: Vec<(Key, Vec<u8>)>,
    cursor: usize,
    ended: bool,
}

#[async_trait::async_trait]
impl KvIterator for MemoryKvIterator {
    async fn next(&mut self) -> KvStoreResult<Option<(Key, Value)>> {
        if self.ended || self.cursor >= self.snapshot.len() {
            return Ok(None);
        }
        let (key, raw) = self.snapshot[self.cursor].clone();
        self.cursor += 1;
        Ok(Some((key, Value::Bytes(raw))))
    }

    async fn seek(&mut self, target: &str) -> KvStoreResult<()> {
        validate_key(target)?;
        if self.ended {
            return Err(KvStoreError::InvalidInput(
                "cannot seek an ended iterator".to_string(),
            ));
        }
        self.cursor = if self.reverse {
            self.snapshot
                .iter()
                .position(|(key, _)| key.as_str() <= target)
                .unwrap_or(self.snapshot.len())
        } else {
            self.snapshot
                .iter()
                .position(|(key, _)| key.as_str() >= target)
                .unwrap_or(self.snapshot.len())
        };
        Ok(())
    }

    async fn end(&mut self) -> KvStoreResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread")]
    async fn get_missing_key_expected_not_found() {
        let store = MemoryKvStore::new();
        let result = store.get("absent", GetOptions::default()).await;
        assert!(matches!(result, Err(KvStoreError::NotFound(key)) if key == "absent"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn get_text_of_binary_value_expected_invalid_input() {
        let store = MemoryKvStore::new();
        store
            .put("blob", Value::bytes(vec![0xff, 0xfe]), PutOptions::default())
            .await
            .expect("put should succeed");

        let result = store.get("blob", GetOptions::text()).await;
        assert!(matches!(result, Err(KvStoreError::InvalidInput(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn batch_put_then_delete_same_key_expected_in_order_application() {
        let store = MemoryKvStore::new();
        store
            .batch(vec![
                Operation::put("a", "1"),
                Operation::delete("a"),
                Operation::put("b", "2"),
            ])
            .await
            .expect("batch should succeed");

        assert!(matches!(
            store.get("a", GetOptions::default()).await,
            Err(KvStoreError::NotFound(_))
        ));
        assert_eq!(
            store.get("b", GetOptions::text()).await.expect("b should exist"),
            Value::text("2")
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn iterator_seek_expected_cursor_at_first_matching_key() {
        let store = MemoryKvStore::new();
        for key in ["a", "c", "e"] {
            store
                .put(key, Value::text(key), PutOptions::default())
                .await
                .expect("put should succeed");
        }

        let mut iterator = store.iterator(IteratorOptions::default());
        iterator.seek("b").await.expect("seek should succeed");
        let (key, _) = iterator
            .next()
            .await
            .expect("next should succeed")
            .expect("an entry at or past the target should exist");
        assert_eq!(key, "c");
    }
}
