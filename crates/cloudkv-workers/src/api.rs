//! Pure request-construction helpers for the Workers KV REST API:
//! auth headers, hierarchical URL composition, and bulk request
//! descriptors. No I/O happens here; dispatch belongs to the adapter.

use base64::Engine;
use cloudkv_store::{Key, KvStoreError, KvStoreResult, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// REST credential. Exactly one variant; fixed at adapter construction.
///
/// See <https://api.cloudflare.com/#getting-started-requests>.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    ApiKey { key: String, email: String },
    ApiToken { token: String },
}

/// Maps a credential to its HTTP header pair(s). Exhaustive over the
/// credential variants.
pub fn auth_headers(credential: &Credential) -> BTreeMap<String, String> {
    match credential {
        Credential::ApiKey { key, email } => BTreeMap::from([
            ("X-Auth-Key".to_string(), key.clone()),
            ("X-Auth-Email".to_string(), email.clone()),
        ]),
        Credential::ApiToken { token } => BTreeMap::from([(
            "Authorization".to_string(),
            format!("Bearer {token}"),
        )]),
    }
}

/// Composes REST endpoint URLs hierarchically: account, then namespace,
/// then bulk. The base endpoint is treated as a directory, so a trailing
/// slash on it never changes the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiUrls {
    api_endpoint: String,
}

impl ApiUrls {
    pub fn new(api_endpoint: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
        }
    }

    fn base(&self) -> &str {
        self.api_endpoint.trim_end_matches('/')
    }

    /// See <https://api.cloudflare.com/#accounts-account-details>.
    pub fn account(&self, account_id: &str) -> String {
        format!("{}/accounts/{account_id}", self.base())
    }

    pub fn namespace(&self, account_id: &str, namespace_id: &str) -> String {
        format!(
            "{}/storage/kv/namespaces/{namespace_id}",
            self.account(account_id)
        )
    }

    /// See <https://api.cloudflare.com/#workers-kv-namespace-write-multiple-key-value-pairs>
    /// and <https://api.cloudflare.com/#workers-kv-namespace-delete-multiple-key-value-pairs>.
    pub fn namespace_bulk(&self, account_id: &str, namespace_id: &str) -> String {
        format!("{}/bulk", self.namespace(account_id, namespace_id))
    }
}

/// One pair in a bulk write body. Text values travel as plain JSON
/// strings; binary values travel base64-encoded with the marker set, per
/// the bulk API contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEntry {
    pub key: Key,
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub base64: bool,
}

impl BulkEntry {
    pub fn new(key: impl Into<Key>, value: &Value) -> Self {
        match value {
            Value::Text(text) => Self {
                key: key.into(),
                value: text.clone(),
                base64: false,
            },
            Value::Bytes(bytes) => Self {
                key: key.into(),
                value: base64::engine::general_purpose::STANDARD.encode(bytes),
                base64: true,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkMethod {
    Put,
    Delete,
}

/// A ready-to-dispatch HTTP request descriptor. Builders only produce
/// these; sending one is the transport's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkRequest {
    pub method: BulkMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Builder for the two bulk request shapes, carrying the endpoint and
/// credential fixed at construction.
#[derive(Clone, Debug)]
pub struct ApiRequests {
    urls: ApiUrls,
    headers: BTreeMap<String, String>,
}

impl ApiRequests {
    pub fn new(api_endpoint: impl Into<String>, credential: &Credential) -> Self {
        let mut headers = auth_headers(credential);
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            urls: ApiUrls::new(api_endpoint),
            headers,
        }
    }

    pub fn bulk_write(
        &self,
        account_id: &str,
        namespace_id: &str,
        entries: &[BulkEntry],
    ) -> KvStoreResult<BulkRequest> {
        Ok(BulkRequest {
            method: BulkMethod::Put,
            url: self.urls.namespace_bulk(account_id, namespace_id),
            headers: self.headers.clone(),
            body: serde_json::to_string(entries)
                .map_err(|err| KvStoreError::Serialization(err.to_string()))?,
        })
    }

    pub fn bulk_delete(
        &self,
        account_id: &str,
        namespace_id: &str,
        keys: &[Key],
    ) -> KvStoreResult<BulkRequest> {
        Ok(BulkRequest {
            method: BulkMethod::Delete,
            url: self.urls.namespace_bulk(account_id, namespace_id),
            headers: self.headers.clone(),
            body: serde_json::to_string(keys)
                .map_err(|err| KvStoreError::Serialization(err.to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_headers_api_token_expected_bearer_only() {
        let headers = auth_headers(&Credential::ApiToken {
            token: "t".to_string(),
        });

        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer t"));
        assert!(!headers.contains_key("X-Auth-Key"));
        assert!(!headers.contains_key("X-Auth-Email"));
    }

    #[test]
    fn auth_headers_api_key_expected_key_and_email_only() {
        let headers = auth_headers(&Credential::ApiKey {
            key: "k".to_string(),
            email: "e@x.com".to_string(),
        });

        assert_eq!(headers.get("X-Auth-Key").map(String::as_str), Some("k"));
        assert_eq!(headers.get("X-Auth-Email").map(String::as_str), Some("e@x.com"));
        assert!(!headers.contains_key("Authorization"));
    }

    #[test]
    fn namespace_bulk_with_trailing_slash_endpoint_expected_single_slashes() {
        let urls = ApiUrls::new("https://api.example.com/v4/");
        assert_eq!(
            urls.namespace_bulk("A", "N"),
            "https://api.example.com/v4/accounts/A/storage/kv/namespaces/N/bulk"
        );
    }

    #[test]
    fn namespace_bulk_composition_expected_same_as_direct_helpers() {
        let urls = ApiUrls::new("https://api.example.com/v4");
        let direct = format!("{}/bulk", urls.namespace("A", "N"));
        assert_eq!(urls.namespace_bulk("A", "N"), direct);
        assert_eq!(urls.account("A"), "https://api.example.com/v4/accounts/A");
    }

    #[test]
    fn bulk_write_body_expected_exact_entry_array() {
        let requests = ApiRequests::new(
            "https://api.example.com/v4",
            &Credential::ApiToken {
                token: "t".to_string(),
            },
        );
        let entries = vec![
            BulkEntry::new("a", &Value::text("1")),
            BulkEntry::new("b", &Value::text("2")),
        ];

        let request = requests
            .bulk_write("A", "N", &entries)
            .expect("bulk write descriptor should build");

        assert_eq!(request.method, BulkMethod::Put);
        assert_eq!(
            request.body,
            r#"[{"key":"a","value":"1"},{"key":"b","value":"2"}]"#
        );
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer t")
        );
    }

    #[test]
    fn bulk_write_binary_entry_expected_base64_marker() {
        let entry = BulkEntry::new("blob", &Value::bytes(vec![1u8, 2, 3]));
        assert!(entry.base64);

        let encoded = serde_json::to_string(&entry).expect("entry should serialize");
        assert_eq!(encoded, r#"{"key":"blob","value":"AQID","base64":true}"#);
    }

    #[test]
    fn bulk_delete_body_expected_key_string_array() {
        let requests = ApiRequests::new(
            "https://api.example.com/v4",
            &Credential::ApiKey {
                key: "k".to_string(),
                email: "e@x.com".to_string(),
            },
        );

        let request = requests
            .bulk_delete("A", "N", &["c".to_string()])
            .expect("bulk delete descriptor should build");

        assert_eq!(request.method, BulkMethod::Delete);
        assert_eq!(request.body, r#"["c"]"#);
        assert_eq!(
            request.url,
            "https://api.example.com/v4/accounts/A/storage/kv/namespaces/N/bulk"
        );
    }
}
