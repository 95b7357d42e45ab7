//! Cloud Logging bucket generator
//!
//! Walks log buckets across every location (`locations/-`). The provider
//! reports `retentionDays: 0` for buckets whose retention it has not
//! resolved yet; that sentinel is stripped after conversion because the
//! import refresh stage fills the real value in.

use super::{short_name, GoogleService};
use crate::core::{
    DiscoveryError, DiscoverySink, Paginator, Resource, ResourceGenerator, ServiceContext,
    Transform, TransformPipeline,
};
use crate::google::client::PagedList;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

pub const LOGGING_BUCKET_KIND: &str = "google_logging_bucket";

const ALLOW_EMPTY_VALUES: &[&str] = &["retention_days"];

pub struct LoggingBucketGenerator {
    service: GoogleService,
}

impl LoggingBucketGenerator {
    pub fn new(service: GoogleService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ResourceGenerator for LoggingBucketGenerator {
    fn kind(&self) -> &'static str {
        LOGGING_BUCKET_KIND
    }

    fn context(&self) -> &ServiceContext {
        self.service.context()
    }

    async fn discover(&self, sink: &mut DiscoverySink) -> Result<(), DiscoveryError> {
        let client = self.service.client();

        let pager = Paginator::new(PagedList::new(
            client,
            client.logging_buckets_url("-"),
            "buckets",
        ));
        let buckets = pager.drain(self.kind(), sink.diagnostics_mut()).await?;

        for bucket in buckets {
            // Full resource name: projects/{p}/locations/{l}/buckets/{b}
            let Some(id) = bucket.get("name").and_then(|v| v.as_str()) else {
                continue;
            };

            let mut attributes = BTreeMap::new();
            let retention = bucket
                .get("retentionDays")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            attributes.insert("retention_days".to_string(), retention.to_string());
            if let Some(description) = bucket.get("description").and_then(|v| v.as_str()) {
                attributes.insert("description".to_string(), description.to_string());
            }
            if let Some(locked) = bucket.get("locked").and_then(|v| v.as_bool()) {
                attributes.insert("locked".to_string(), locked.to_string());
            }

            sink.emit(
                id,
                short_name(id),
                self.kind(),
                attributes,
                ALLOW_EMPTY_VALUES,
                HashMap::new(),
            );
        }

        Ok(())
    }

    /// Remove the retention sentinel the refresh stage overwrites.
    fn post_convert(&self, resources: &mut Vec<Resource>) {
        TransformPipeline::new()
            .with(Transform::StripDerived {
                kind: LOGGING_BUCKET_KIND.to_string(),
                attribute: "retention_days".to_string(),
                sentinel: Some("0".to_string()),
            })
            .apply(resources);
    }
}
