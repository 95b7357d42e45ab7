//! Resource kind registry
//!
//! The explicit map from resource-kind names to generator constructors.
//! Kind selection happens here and nowhere else.

use super::compute::{
    ComputeInstanceGenerator, ComputeNetworkGenerator, COMPUTE_INSTANCE_KIND, COMPUTE_NETWORK_KIND,
};
use super::logging::{LoggingBucketGenerator, LOGGING_BUCKET_KIND};
use super::storage::{StorageBucketGenerator, STORAGE_BUCKET_KIND};
use super::GoogleService;
use crate::core::{ResourceGenerator, ServiceContext};
use crate::google::client::GoogleClient;

/// Every kind this provider can discover, in the order they run.
pub fn all_kinds() -> &'static [&'static str] {
    &[
        STORAGE_BUCKET_KIND,
        LOGGING_BUCKET_KIND,
        COMPUTE_INSTANCE_KIND,
        COMPUTE_NETWORK_KIND,
    ]
}

/// Construct the generator for `kind`, or `None` for an unknown kind.
pub fn generator_for(
    kind: &str,
    ctx: &ServiceContext,
    client: &GoogleClient,
) -> Option<Box<dyn ResourceGenerator>> {
    let service = GoogleService::new(ctx.clone(), client.clone());
    match kind {
        STORAGE_BUCKET_KIND => Some(Box::new(StorageBucketGenerator::new(service))),
        LOGGING_BUCKET_KIND => Some(Box::new(LoggingBucketGenerator::new(service))),
        COMPUTE_INSTANCE_KIND => Some(Box::new(ComputeInstanceGenerator::new(service))),
        COMPUTE_NETWORK_KIND => Some(Box::new(ComputeNetworkGenerator::new(service))),
        _ => None,
    }
}
