use crate::api::{ApiRequests, BulkEntry, Credential};
use crate::binding::KvBinding;
use crate::transport::{BulkResponse, BulkTransport, ReqwestBulkTransport};
use crate::BoxError;
use async_trait::async_trait;
use cloudkv_store::{
    validate_key, GetOptions, IteratorOptions, KvIterator, KvStore, KvStoreError, KvStoreResult,
    Key, Operation, PutOptions, Value,
};
use futures::future;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const DEFAULT_API_ENDPOINT: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_CACHE_TTL: u64 = 60;

/// Adapter configuration, fixed for the adapter's lifetime.
///
/// `account_id`, `namespace_id`, and `credential` are required only if
/// `batch()` will be called; point operations need none of them.
#[derive(Clone, Debug)]
pub struct WorkersKvConfig {
    pub api_endpoint: String,
    pub account_id: Option<String>,
    pub namespace_id: Option<String>,
    pub credential: Option<Credential>,
    pub default_cache_ttl: u64,
}

impl Default for WorkersKvConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            account_id: None,
            namespace_id: None,
            credential: None,
            default_cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// [`KvStore`] over Cloudflare Workers KV.
///
/// Point operations go straight to the binding. Batches go through the
/// authenticated bulk REST endpoint: the operation list is split into a
/// put list and a delete-key list, one bulk request is built for each,
/// and both are dispatched concurrently. There is no atomicity across
/// the two bulk calls; whichever succeeded has taken effect even if the
/// other failed. Retry policy is the caller's.
#[derive(Clone, Debug)]
pub struct WorkersKvStore<B, T> {
    binding: B,
    transport: T,
    config: WorkersKvConfig,
}

impl<B> WorkersKvStore<B, ReqwestBulkTransport> {
    pub fn new(binding: B, config: WorkersKvConfig) -> Self {
        Self::with_transport(binding, ReqwestBulkTransport::new(), config)
    }
}

impl<B, T> WorkersKvStore<B, T> {
    pub fn with_transport(binding: B, transport: T, config: WorkersKvConfig) -> Self {
        Self {
            binding,
            transport,
            config,
        }
    }

    pub fn config(&self) -> &WorkersKvConfig {
        &self.config
    }
}

impl<B, T> WorkersKvStore<B, T>
where
    B: KvBinding,
    T: BulkTransport,
{
    fn bulk_context(&self) -> KvStoreResult<(&str, &str, &Credential)> {
        let account_id = self
            .config
            .account_id
            .as_deref()
            .ok_or(KvStoreError::Config {
                missing: "account_id",
            })?;
        let namespace_id = self
            .config
            .namespace_id
            .as_deref()
            .ok_or(KvStoreError::Config {
                missing: "namespace_id",
            })?;
        let credential = self
            .config
            .credential
            .as_ref()
            .ok_or(KvStoreError::Config {
                missing: "credential",
            })?;
        Ok((account_id, namespace_id, credential))
    }

    fn check_bulk_outcome(
        call: &str,
        outcome: Result<BulkResponse, BoxError>,
    ) -> KvStoreResult<()> {
        let response = outcome.map_err(KvStoreError::transport)?;
        if response.is_success() {
            return Ok(());
        }
        warn!(call, status = response.status, "bulk request rejected");
        Err(KvStoreError::transport(format!(
            "{call} failed with status {}: {}",
            response.status, response.body
        )))
    }
}

#[async_trait]
impl<B, T> KvStore for WorkersKvStore<B, T>
where
    B: KvBinding,
    T: BulkTransport,
{
    async fn open(&self) -> KvStoreResult<()> {
        // The binding is always ready; nothing to establish.
        Ok(())
    }

    async fn close(&self) -> KvStoreResult<()> {
        Ok(())
    }

    async fn get(&self, key: &str, options: GetOptions) -> KvStoreResult<Value> {
        validate_key(key)?;
        let cache_ttl = options.cache_ttl.unwrap_or(self.config.default_cache_ttl);
        let value = self
            .binding
            .get(key, options.read_as, cache_ttl)
            .await
            .map_err(KvStoreError::transport)?;
        value.ok_or_else(|| KvStoreError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, value: Value, options: PutOptions) -> KvStoreResult<()> {
        validate_key(key)?;
        self.binding
            .put(key, &value, options.metadata.as_ref())
            .await
            .map_err(KvStoreError::transport)
    }

    async fn delete(&self, key: &str) -> KvStoreResult<()> {
        validate_key(key)?;
        self.binding
            .delete(key)
            .await
            .map_err(KvStoreError::transport)
    }

    async fn batch(&self, operations: Vec<Operation>) -> KvStoreResult<()> {
        let (account_id, namespace_id, credential) = self.bulk_context()?;

        let mut entries: Vec<BulkEntry> = Vec::new();
        let mut delete_keys: Vec<Key> = Vec::new();
        for operation in &operations {
            validate_key(operation.key())?;
            match operation {
                Operation::Put { key, value } => entries.push(BulkEntry::new(key.clone(), value)),
                Operation::Delete { key } => delete_keys.push(key.clone()),
            }
        }

        // The two bulk calls have no mutual ordering, so a key on both
        // sides of one batch has no defined final state. Rejected up
        // front, before any network activity.
        let put_keys: BTreeSet<&str> = entries.iter().map(|entry| entry.key.as_str()).collect();
        if let Some(key) = delete_keys.iter().find(|key| put_keys.contains(key.as_str())) {
            return Err(KvStoreError::InvalidInput(format!(
                "key {key:?} appears in both the put and delete sides of one batch"
            )));
        }

        let requests = ApiRequests::new(self.config.api_endpoint.clone(), credential);
        let write = requests.bulk_write(account_id, namespace_id, &entries)?;
        let delete = requests.bulk_delete(account_id, namespace_id, &delete_keys)?;

        debug!(
            puts = entries.len(),
            deletes = delete_keys.len(),
            "dispatching bulk kv requests"
        );
        let (write_outcome, delete_outcome) = future::join(
            self.transport.dispatch(write),
            self.transport.dispatch(delete),
        )
        .await;

        Self::check_bulk_outcome("bulk write", write_outcome)?;
        Self::check_bulk_outcome("bulk delete", delete_outcome)?;
        Ok(())
    }

    fn iterator(&self, options: IteratorOptions) -> Box<dyn KvIterator> {
        Box::new(WorkersKvIterator::new(options))
    }
}

/// Iterator handle over the Workers KV binding. The binding exposes no
/// range-scan primitive, so the handle stays in its created state and
/// every operation on it fails with `Unsupported`.
pub struct WorkersKvIterator {
    _options: IteratorOptions,
}

impl WorkersKvIterator {
    pub fn new(options: IteratorOptions) -> Self {
        Self { _options: options }
    }

    fn unsupported() -> KvStoreError {
        KvStoreError::Unsupported(
            "range iteration is not available over the Workers KV binding".to_string(),
        )
    }
}

#[async_trait]
impl KvIterator for WorkersKvIterator {
    async fn next(&mut self) -> KvStoreResult<Option<(Key, Value)>> {
        Err(Self::unsupported())
    }

    async fn seek(&mut self, _target: &str) -> KvStoreResult<()> {
        Err(Self::unsupported())
    }

    async fn end(&mut self) -> KvStoreResult<()> {
        Err(Self::unsupported())
    }
}
