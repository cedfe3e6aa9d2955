//! Test doubles: an in-process binding and a transport that records
//! every dispatched descriptor.

use crate::api::BulkRequest;
use crate::binding::KvBinding;
use crate::transport::{BulkResponse, BulkTransport};
use crate::BoxError;
use async_trait::async_trait;
use cloudkv_store::{Key, ReadAs, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
struct MockEntry {
    raw: Vec<u8>,
    metadata: Option<JsonValue>,
}

/// In-process stand-in for the edge binding. Strongly consistent by
/// construction, unlike the real service.
#[derive(Clone, Debug, Default)]
pub struct MockKvBinding {
    inner: Arc<Mutex<BTreeMap<Key, MockEntry>>>,
}

impl MockKvBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let entries = self.inner.lock().expect("mock binding mutex poisoned");
        entries.contains_key(key)
    }

    pub fn metadata(&self, key: &str) -> Option<JsonValue> {
        let entries = self.inner.lock().expect("mock binding mutex poisoned");
        entries.get(key).and_then(|entry| entry.metadata.clone())
    }
}

#[async_trait]
impl KvBinding for MockKvBinding {
    async fn get(
        &self,
        key: &str,
        read_as: ReadAs,
        _cache_ttl: u64,
    ) -> Result<Option<Value>, BoxError> {
        let entries = self
            .inner
            .lock()
            .map_err(|_| "mock binding mutex poisoned")?;
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        let value = match read_as {
            ReadAs::Bytes => Value::Bytes(entry.raw.clone()),
            ReadAs::Text => Value::Text(String::from_utf8(entry.raw.clone())?),
        };
        Ok(Some(value))
    }

    async fn put(
        &self,
        key: &str,
        value: &Value,
        metadata: Option<&JsonValue>,
    ) -> Result<(), BoxError> {
        let mut entries = self
            .inner
            .lock()
            .map_err(|_| "mock binding mutex poisoned")?;
        entries.insert(
            key.to_string(),
            MockEntry {
                raw: value.as_bytes().to_vec(),
                metadata: metadata.cloned(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BoxError> {
        let mut entries = self
            .inner
            .lock()
            .map_err(|_| "mock binding mutex poisoned")?;
        entries.remove(key);
        Ok(())
    }
}

/// Transport that captures every descriptor it is handed and answers
/// with a canned response, so tests can assert call counts, methods,
/// URLs, headers, and bodies.
#[derive(Clone, Debug)]
pub struct RecordingBulkTransport {
    requests: Arc<Mutex<Vec<BulkRequest>>>,
    status: u16,
    failure: Option<String>,
}

impl RecordingBulkTransport {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            status: 200,
            failure: None,
        }
    }

    /// Responds to every dispatch with the given HTTP status.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::new()
        }
    }

    /// Fails every dispatch before producing a response, as a network
    /// error would.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    pub fn requests(&self) -> Vec<BulkRequest> {
        self.requests
            .lock()
            .expect("recording transport mutex poisoned")
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .expect("recording transport mutex poisoned")
            .len()
    }
}

impl Default for RecordingBulkTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BulkTransport for RecordingBulkTransport {
    async fn dispatch(&self, request: BulkRequest) -> Result<BulkResponse, BoxError> {
        self.requests
            .lock()
            .map_err(|_| "recording transport mutex poisoned")?
            .push(request);

        if let Some(message) = &self.failure {
            return Err(message.clone().into());
        }

        Ok(BulkResponse {
            status: self.status,
            body: r#"{"success":true}"#.to_string(),
        })
    }
}
