#![doc = r#"
Cloudflare Workers KV adapter for the `cloudkv-store` traits.

Operation mapping:

| Store trait method | Workers KV API |
| --- | --- |
| `KvStore::get` | binding `get` with `text`/`arrayBuffer` type and `cacheTtl` |
| `KvStore::put` | binding `put` with optional metadata |
| `KvStore::delete` | binding `delete` |
| `KvStore::batch` (puts) | REST `PUT .../storage/kv/namespaces/:id/bulk` |
| `KvStore::batch` (deletes) | REST `DELETE .../storage/kv/namespaces/:id/bulk` |
| `KvStore::iterator` | no binding primitive; every handle operation is `Unsupported` |

Implementation notes:
- Point operations go straight to the binding and never touch the REST
  credentials or URL machinery.
- One `batch()` call builds both bulk descriptors, then dispatches them
  concurrently and waits for both to settle. There is no atomicity
  across the two calls; a key on both sides of one batch is rejected
  before any network activity.
- The bulk transport is injectable at construction;
  `testing::RecordingBulkTransport` captures descriptors for assertions.
- No retries anywhere in this layer; resilience policy is the caller's.
"#]

pub mod adapter;
pub mod api;
pub mod binding;
pub mod testing;
pub mod transport;

/// Opaque failure cause carried by the binding and transport seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use adapter::{
    WorkersKvConfig, WorkersKvIterator, WorkersKvStore, DEFAULT_API_ENDPOINT, DEFAULT_CACHE_TTL,
};
pub use api::{auth_headers, ApiRequests, ApiUrls, BulkEntry, BulkMethod, BulkRequest, Credential};
pub use binding::KvBinding;
pub use testing::{MockKvBinding, RecordingBulkTransport};
pub use transport::{BulkResponse, BulkTransport, ReqwestBulkTransport};
