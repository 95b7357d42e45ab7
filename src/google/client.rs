//! Google Cloud client
//!
//! Combines credentials and the HTTP wrapper, and builds URLs for the API
//! families discovery touches. Endpoints are overridable so tests can point
//! the client at a mock server. The page sources at the bottom adapt
//! Google's two list shapes to the core pagination contract.

use super::auth::GoogleCredentials;
use super::http::GoogleHttpClient;
use crate::core::{DiscoveryError, Page, PageSource};
use async_trait::async_trait;
use serde_json::Value;

/// Base URLs per API family.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub storage: String,
    pub compute: String,
    pub logging: String,
    pub resourcemanager: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            storage: "https://storage.googleapis.com/storage/v1".to_string(),
            compute: "https://compute.googleapis.com/compute/v1".to_string(),
            logging: "https://logging.googleapis.com/v2".to_string(),
            resourcemanager: "https://cloudresourcemanager.googleapis.com/v1".to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Point every family at one base URL. For tests against a mock server.
    pub fn single_host(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            storage: format!("{base}/storage/v1"),
            compute: format!("{base}/compute/v1"),
            logging: format!("{base}/logging/v2"),
            resourcemanager: format!("{base}/resourcemanager/v1"),
        }
    }
}

/// Main Google Cloud client.
#[derive(Clone)]
pub struct GoogleClient {
    pub credentials: GoogleCredentials,
    pub http: GoogleHttpClient,
    pub project_id: String,
    endpoints: ApiEndpoints,
}

impl GoogleClient {
    /// Create a client using Application Default Credentials.
    pub async fn new(project_id: &str) -> Result<Self, DiscoveryError> {
        let credentials = GoogleCredentials::new().await?;
        let http = GoogleHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            project_id: project_id.to_string(),
            endpoints: ApiEndpoints::default(),
        })
    }

    /// Create a client from explicit parts. Used by tests to inject a
    /// static token and mock endpoints.
    pub fn with_parts(
        credentials: GoogleCredentials,
        http: GoogleHttpClient,
        project_id: &str,
        endpoints: ApiEndpoints,
    ) -> Self {
        Self {
            credentials,
            http,
            project_id: project_id.to_string(),
            endpoints,
        }
    }

    /// Make an authenticated GET request.
    pub async fn get(&self, url: &str) -> Result<Value, DiscoveryError> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }

    // =========================================================================
    // Cloud Storage API helpers
    // =========================================================================

    /// Bucket listing URL for the client's project.
    pub fn storage_buckets_url(&self) -> String {
        format!(
            "{}/b?project={}",
            self.endpoints.storage,
            urlencoding::encode(&self.project_id)
        )
    }

    /// IAM policy URL for one bucket.
    pub fn storage_bucket_iam_url(&self, bucket: &str) -> String {
        format!(
            "{}/b/{}/iam",
            self.endpoints.storage,
            urlencoding::encode(bucket)
        )
    }

    // =========================================================================
    // Compute Engine API helpers
    // =========================================================================

    /// Build Compute Engine API URL
    pub fn compute_url(&self, path: &str) -> String {
        format!(
            "{}/projects/{}/{}",
            self.endpoints.compute, self.project_id, path
        )
    }

    /// Build zonal Compute Engine API URL
    pub fn compute_zonal_url(&self, zone: &str, resource: &str) -> String {
        self.compute_url(&format!("zones/{}/{}", zone, resource))
    }

    /// Build global Compute Engine API URL
    pub fn compute_global_url(&self, resource: &str) -> String {
        self.compute_url(&format!("global/{}", resource))
    }

    // =========================================================================
    // Cloud Logging API helpers
    // =========================================================================

    /// Build Cloud Logging API URL
    pub fn logging_url(&self, path: &str) -> String {
        format!(
            "{}/projects/{}/{}",
            self.endpoints.logging, self.project_id, path
        )
    }

    /// Log bucket listing URL. `-` lists every location.
    pub fn logging_buckets_url(&self, location: &str) -> String {
        self.logging_url(&format!("locations/{}/buckets", location))
    }

    // =========================================================================
    // Resource Manager API helpers
    // =========================================================================

    /// Build Resource Manager API URL
    pub fn resourcemanager_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoints.resourcemanager, path)
    }
}

/// Append query parameters, percent-encoded, respecting an existing query
/// string.
pub fn with_query(url: &str, params: &[(&str, &str)]) -> String {
    let mut out = url.to_string();
    for (key, value) in params {
        out.push(if out.contains('?') { '&' } else { '?' });
        out.push_str(&format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(value)
        ));
    }
    out
}

/// Pull the item array out of a list response body.
fn extract_items(body: &Value, items_key: &str) -> Vec<Value> {
    body.get(items_key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

/// Cursor-driven list call: threads `pageToken` between requests and reads
/// `nextPageToken` off each response.
pub struct PagedList<'a> {
    client: &'a GoogleClient,
    url: String,
    items_key: &'static str,
}

impl<'a> PagedList<'a> {
    pub fn new(client: &'a GoogleClient, url: String, items_key: &'static str) -> Self {
        Self {
            client,
            url,
            items_key,
        }
    }
}

#[async_trait]
impl PageSource for PagedList<'_> {
    async fn fetch(&mut self, token: Option<&str>) -> Result<Page, DiscoveryError> {
        let url = match token {
            Some(token) => with_query(&self.url, &[("pageToken", token)]),
            None => self.url.clone(),
        };
        let body = self.client.get(&url).await?;
        let next = body
            .get("nextPageToken")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Page {
            items: extract_items(&body, self.items_key),
            next,
        })
    }
}

/// One-shot bulk list call: a single request, always terminal.
pub struct BulkList<'a> {
    client: &'a GoogleClient,
    url: String,
    items_key: &'static str,
}

impl<'a> BulkList<'a> {
    pub fn new(client: &'a GoogleClient, url: String, items_key: &'static str) -> Self {
        Self {
            client,
            url,
            items_key,
        }
    }
}

#[async_trait]
impl PageSource for BulkList<'_> {
    async fn fetch(&mut self, _token: Option<&str>) -> Result<Page, DiscoveryError> {
        let body = self.client.get(&self.url).await?;
        Ok(Page::last(extract_items(&body, self.items_key)))
    }
}
