//! Cloud Storage bucket generator
//!
//! Walks the bucket listing for the project, keeps buckets in the
//! requested region, and enriches each with its IAM policy. A 404 from the
//! policy lookup is benign absence: the bucket is kept without a `policy`
//! attribute. Any other per-bucket failure drops only that bucket.

use super::{flatten_labels, GoogleService};
use crate::core::{
    DiscoveryError, DiscoverySink, Paginator, Resource, ResourceGenerator, ServiceContext,
    Transform, TransformPipeline,
};
use crate::google::client::PagedList;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

pub const STORAGE_BUCKET_KIND: &str = "google_storage_bucket";

const ALLOW_EMPTY_VALUES: &[&str] = &["labels."];

pub struct StorageBucketGenerator {
    service: GoogleService,
}

impl StorageBucketGenerator {
    pub fn new(service: GoogleService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ResourceGenerator for StorageBucketGenerator {
    fn kind(&self) -> &'static str {
        STORAGE_BUCKET_KIND
    }

    fn context(&self) -> &ServiceContext {
        self.service.context()
    }

    async fn discover(&self, sink: &mut DiscoverySink) -> Result<(), DiscoveryError> {
        let client = self.service.client();
        let region = self.service.region()?.to_string();

        let pager = Paginator::new(PagedList::new(client, client.storage_buckets_url(), "items"));
        let buckets = pager.drain(self.kind(), sink.diagnostics_mut()).await?;

        for bucket in buckets {
            let Some(name) = bucket.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            let location = bucket
                .get("location")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            // GCS reports locations upper-case; match the requested region
            // case-insensitively.
            if !location.eq_ignore_ascii_case(&region) {
                continue;
            }

            let mut attributes = BTreeMap::new();
            attributes.insert("force_destroy".to_string(), "false".to_string());
            attributes.insert("location".to_string(), location.to_string());
            if let Some(class) = bucket.get("storageClass").and_then(|v| v.as_str()) {
                attributes.insert("storage_class".to_string(), class.to_string());
            }
            flatten_labels(&bucket, &mut attributes);

            match client.get(&client.storage_bucket_iam_url(name)).await {
                Ok(policy) => {
                    attributes.insert("policy".to_string(), policy.to_string());
                }
                Err(err) if err.is_benign_absence() => {
                    // No policy on this bucket; keep it without the attribute.
                }
                Err(err) => {
                    sink.skip_item(self.kind(), name, &err);
                    continue;
                }
            }

            sink.emit(
                name,
                name,
                self.kind(),
                attributes,
                ALLOW_EMPTY_VALUES,
                HashMap::new(),
            );
        }

        Ok(())
    }

    /// Drop the implicit storage class and reframe the policy document as a
    /// block literal so the renderer emits it verbatim.
    fn post_convert(&self, resources: &mut Vec<Resource>) {
        TransformPipeline::new()
            .with(Transform::DropDefault {
                kind: STORAGE_BUCKET_KIND.to_string(),
                attribute: "storage_class".to_string(),
                default: "STANDARD".to_string(),
            })
            .with(Transform::LiteralBlock {
                kind: STORAGE_BUCKET_KIND.to_string(),
                attribute: "policy".to_string(),
                marker: "POLICY".to_string(),
            })
            .apply(resources);
    }
}
