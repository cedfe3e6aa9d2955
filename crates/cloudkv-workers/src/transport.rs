use crate::api::{BulkMethod, BulkRequest};
use crate::BoxError;
use async_trait::async_trait;

/// Outcome of one dispatched bulk request. The adapter decides what a
/// non-success status means; the transport only carries it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkResponse {
    pub status: u16,
    pub body: String,
}

impl BulkResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Injectable dispatch seam for bulk requests. Supplied at adapter
/// construction so tests can assert call counts and captured descriptors
/// deterministically. No retries or timeouts live here; the
/// implementation's own behavior governs.
#[async_trait]
pub trait BulkTransport: Send + Sync {
    async fn dispatch(&self, request: BulkRequest) -> Result<BulkResponse, BoxError>;
}

#[async_trait]
impl<T> BulkTransport for std::sync::Arc<T>
where
    T: BulkTransport + ?Sized,
{
    async fn dispatch(&self, request: BulkRequest) -> Result<BulkResponse, BoxError> {
        (**self).dispatch(request).await
    }
}

/// Default transport over a shared `reqwest` client.
#[derive(Clone, Debug, Default)]
pub struct ReqwestBulkTransport {
    client: reqwest::Client,
}

impl ReqwestBulkTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BulkTransport for ReqwestBulkTransport {
    async fn dispatch(&self, request: BulkRequest) -> Result<BulkResponse, BoxError> {
        let method = match request.method {
            BulkMethod::Put => reqwest::Method::PUT,
            BulkMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(BulkResponse { status, body })
    }
}
