use crate::types::{GetOptions, IteratorOptions, Key, Operation, PutOptions, Value};

#[derive(Debug, thiserror::Error)]
pub enum KvStoreError {
    /// A `get` found no value for the key. Expected-path outcome, not a
    /// system fault.
    #[error("key not found: {0}")]
    NotFound(Key),

    /// A batch precondition is unmet. Raised before any network activity.
    #[error("{missing} must be configured to use batch operations")]
    Config { missing: &'static str },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    /// An underlying binding or HTTP failure. The original cause is
    /// preserved as the error source.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl KvStoreError {
    pub fn transport(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(cause.into())
    }
}

pub type KvStoreResult<T> = Result<T, KvStoreError>;

/// Keys are non-empty text identifiers.
pub fn validate_key(key: &str) -> KvStoreResult<()> {
    if key.is_empty() {
        return Err(KvStoreError::InvalidInput(
            "key must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// The uniform storage contract: point reads and writes, ordered batch
/// writes, and range iteration. Implementers that cannot honor a
/// capability surface that as `KvStoreError::Unsupported` rather than
/// silently ignoring it.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    async fn open(&self) -> KvStoreResult<()>;

    async fn close(&self) -> KvStoreResult<()>;

    async fn get(&self, key: &str, options: GetOptions) -> KvStoreResult<Value>;

    async fn put(&self, key: &str, value: Value, options: PutOptions) -> KvStoreResult<()>;

    async fn delete(&self, key: &str) -> KvStoreResult<()>;

    /// Applies an ordered sequence of operations. Atomicity across the
    /// whole batch is implementation-defined; see the implementer's
    /// documentation before relying on it.
    async fn batch(&self, operations: Vec<Operation>) -> KvStoreResult<()>;

    /// Returns an iterator handle. Construction itself never fails; an
    /// implementer without range-scan support fails every operation on
    /// the returned handle instead.
    fn iterator(&self, options: IteratorOptions) -> Box<dyn KvIterator>;
}

#[async_trait::async_trait]
pub trait KvIterator: Send {
    /// Yields the next entry, or `None` once the range is exhausted.
    async fn next(&mut self) -> KvStoreResult<Option<(Key, Value)>>;

    /// Repositions the cursor at the first key at or past `target`
    /// (at or before it for a reverse iterator).
    async fn seek(&mut self, target: &str) -> KvStoreResult<()>;

    /// Releases the iterator. Further calls to `next` yield nothing.
    async fn end(&mut self) -> KvStoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_expected_to_name_missing_field() {
        let error = KvStoreError::Config {
            missing: "account_id",
        };
        assert_eq!(
            error.to_string(),
            "account_id must be configured to use batch operations"
        );
    }

    #[test]
    fn transport_error_expected_to_preserve_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
        let error = KvStoreError::transport(cause);
        let source = std::error::Error::source(&error).expect("transport error should have a source");
        assert!(source.to_string().contains("peer reset"));
    }

    #[test]
    fn validate_key_empty_expected_invalid_input() {
        assert!(matches!(
            validate_key(""),
            Err(KvStoreError::InvalidInput(_))
        ));
        assert!(validate_key("a").is_ok());
    }
}
