use crate::BoxError;
use async_trait::async_trait;
use cloudkv_store::{ReadAs, Value};
use serde_json::Value as JsonValue;

/// The edge-binding seam for point operations.
///
/// A binding handle is always ready; there is no connection lifecycle to
/// manage. Point operations go through here and never touch the REST
/// credentials. Failures carry the binding's own cause and are wrapped
/// into `KvStoreError::Transport` by the adapter.
#[async_trait]
pub trait KvBinding: Send + Sync {
    /// Reads `key` in the requested representation, honoring the cache
    /// staleness hint. Absence is `Ok(None)`, not an error.
    async fn get(
        &self,
        key: &str,
        read_as: ReadAs,
        cache_ttl: u64,
    ) -> Result<Option<Value>, BoxError>;

    async fn put(
        &self,
        key: &str,
        value: &Value,
        metadata: Option<&JsonValue>,
    ) -> Result<(), BoxError>;

    /// Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), BoxError>;
}

#[async_trait]
impl<T> KvBinding for std::sync::Arc<T>
where
    T: KvBinding + ?Sized,
{
    async fn get(
        &self,
        key: &str,
        read_as: ReadAs,
        cache_ttl: u64,
    ) -> Result<Option<Value>, BoxError> {
        (**self).get(key, read_as, cache_ttl).await
    }

    async fn put(
        &self,
        key: &str,
        value: &Value,
        metadata: Option<&JsonValue>,
    ) -> Result<(), BoxError> {
        (**self).put(key, value, metadata).await
    }

    async fn delete(&self, key: &str) -> Result<(), BoxError> {
        (**self).delete(key).await
    }
}
