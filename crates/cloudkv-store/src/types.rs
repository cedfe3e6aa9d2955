use serde_json::Value as JsonValue;

pub type Key = String;

/// A stored value, materialized as text or raw bytes.
///
/// The backing store keeps one representation per key; which one a read
/// returns is selected by [`ReadAs`] on the read itself, never mixed
/// within a single call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

/// Read-mode selector for `get`. Defaults to `Bytes`, matching the
/// buffer-first convention of the storage interface this crate models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadAs {
    Text,
    #[default]
    Bytes,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub read_as: ReadAs,
    /// Advisory staleness tolerance in seconds. `None` falls back to the
    /// store's configured default. Never affects write semantics.
    pub cache_ttl: Option<u64>,
}

impl GetOptions {
    pub fn text() -> Self {
        Self {
            read_as: ReadAs::Text,
            cache_ttl: None,
        }
    }

    pub fn bytes() -> Self {
        Self {
            read_as: ReadAs::Bytes,
            cache_ttl: None,
        }
    }

    pub fn with_cache_ttl(mut self, cache_ttl: u64) -> Self {
        self.cache_ttl = Some(cache_ttl);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PutOptions {
    /// Arbitrary JSON document associated with the key-value pair.
    pub metadata: Option<JsonValue>,
}

impl PutOptions {
    pub fn with_metadata(metadata: JsonValue) -> Self {
        Self {
            metadata: Some(metadata),
        }
    }
}

/// One element of an ordered batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Put { key: Key, value: Value },
    Delete { key: Key },
}

impl Operation {
    pub fn put(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Key>) -> Self {
        Self::Delete { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IteratorOptions {
    pub reverse: bool,
    pub limit: Option<usize>,
}
