//! Compute Engine generators
//!
//! Instances come from the zonal listing (cursor walk); networks from the
//! one-shot global listing. Instance identifiers follow the import path
//! convention `projects/{p}/zones/{z}/instances/{name}`.

use super::{flatten_labels, short_name, GoogleService};
use crate::core::{
    DiscoveryError, DiscoverySink, Paginator, Resource, ResourceGenerator, ServiceContext,
    Transform, TransformPipeline,
};
use crate::google::client::{BulkList, PagedList};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

pub const COMPUTE_INSTANCE_KIND: &str = "google_compute_instance";
pub const COMPUTE_NETWORK_KIND: &str = "google_compute_network";

const INSTANCE_ALLOW_EMPTY_VALUES: &[&str] = &["labels."];

pub struct ComputeInstanceGenerator {
    service: GoogleService,
}

impl ComputeInstanceGenerator {
    pub fn new(service: GoogleService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ResourceGenerator for ComputeInstanceGenerator {
    fn kind(&self) -> &'static str {
        COMPUTE_INSTANCE_KIND
    }

    fn context(&self) -> &ServiceContext {
        self.service.context()
    }

    async fn discover(&self, sink: &mut DiscoverySink) -> Result<(), DiscoveryError> {
        let client = self.service.client();
        let project = self.service.project()?.to_string();
        let zone = self.service.zone()?.to_string();

        let pager = Paginator::new(PagedList::new(
            client,
            client.compute_zonal_url(&zone, "instances"),
            "items",
        ));
        let instances = pager.drain(self.kind(), sink.diagnostics_mut()).await?;

        for instance in instances {
            let Some(name) = instance.get("name").and_then(|v| v.as_str()) else {
                continue;
            };

            let mut attributes = BTreeMap::new();
            if let Some(machine_type) = instance.get("machineType").and_then(|v| v.as_str()) {
                attributes.insert(
                    "machine_type".to_string(),
                    short_name(machine_type).to_string(),
                );
            }
            if let Some(instance_zone) = instance.get("zone").and_then(|v| v.as_str()) {
                attributes.insert("zone".to_string(), short_name(instance_zone).to_string());
            }
            if let Some(status) = instance.get("status").and_then(|v| v.as_str()) {
                attributes.insert("status".to_string(), status.to_string());
            }
            let deletion_protection = instance
                .get("deletionProtection")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            attributes.insert(
                "deletion_protection".to_string(),
                deletion_protection.to_string(),
            );
            flatten_labels(&instance, &mut attributes);

            let id = format!("projects/{project}/zones/{zone}/instances/{name}");
            sink.emit(
                &id,
                name,
                self.kind(),
                attributes,
                INSTANCE_ALLOW_EMPTY_VALUES,
                HashMap::new(),
            );
        }

        Ok(())
    }

    fn post_convert(&self, resources: &mut Vec<Resource>) {
        TransformPipeline::new()
            .with(Transform::DropDefault {
                kind: COMPUTE_INSTANCE_KIND.to_string(),
                attribute: "deletion_protection".to_string(),
                default: "false".to_string(),
            })
            .apply(resources);
    }
}

pub struct ComputeNetworkGenerator {
    service: GoogleService,
}

impl ComputeNetworkGenerator {
    pub fn new(service: GoogleService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ResourceGenerator for ComputeNetworkGenerator {
    fn kind(&self) -> &'static str {
        COMPUTE_NETWORK_KIND
    }

    fn context(&self) -> &ServiceContext {
        self.service.context()
    }

    async fn discover(&self, sink: &mut DiscoverySink) -> Result<(), DiscoveryError> {
        let client = self.service.client();

        let pager = Paginator::new(BulkList::new(
            client,
            client.compute_global_url("networks"),
            "items",
        ));
        let networks = pager.drain(self.kind(), sink.diagnostics_mut()).await?;

        for network in networks {
            let Some(name) = network.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            sink.emit_simple(name, name, self.kind());
        }

        Ok(())
    }
}
