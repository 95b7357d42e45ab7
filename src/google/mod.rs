//! Google Cloud provider
//!
//! Provider-specific half of the pipeline: authentication, the REST
//! client, and one generator per supported resource kind.
//!
//! # Module Structure
//!
//! - [`auth`] - authentication using Application Default Credentials
//! - [`client`] - the API client, URL builders, and page sources
//! - [`http`] - HTTP utilities for REST API calls
//! - [`projects`] - project enumeration
//! - [`registry`] - the explicit kind-name registry
//! - [`storage`], [`logging`], [`compute`] - the generators

pub mod auth;
pub mod client;
pub mod compute;
pub mod http;
pub mod logging;
pub mod projects;
pub mod registry;
pub mod storage;

use crate::core::{DiscoveryError, ServiceContext};
use client::GoogleClient;
use serde_json::Value;
use std::collections::BTreeMap;

/// Provider name stamped on every resource.
pub const PROVIDER_NAME: &str = "google";

/// Shared base for every Google generator: the read-only context plus the
/// API client, with typed projections over the named-argument bag.
#[derive(Clone)]
pub struct GoogleService {
    ctx: ServiceContext,
    client: GoogleClient,
}

impl GoogleService {
    pub fn new(ctx: ServiceContext, client: GoogleClient) -> Self {
        Self { ctx, client }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn client(&self) -> &GoogleClient {
        &self.client
    }

    pub fn project(&self) -> Result<&str, DiscoveryError> {
        self.ctx.str_arg("project")
    }

    pub fn region(&self) -> Result<&str, DiscoveryError> {
        self.ctx.str_arg("region")
    }

    pub fn zone(&self) -> Result<&str, DiscoveryError> {
        self.ctx.str_arg("zone")
    }
}

/// Last path segment of a Google resource URL,
/// e.g. ".../zones/us-central1-a" -> "us-central1-a".
pub(crate) fn short_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Flatten an item's `labels` object into `labels.<key>` attributes.
pub(crate) fn flatten_labels(item: &Value, attributes: &mut BTreeMap<String, String>) {
    if let Some(labels) = item.get("labels").and_then(|v| v.as_object()) {
        for (key, value) in labels {
            if let Some(value) = value.as_str() {
                attributes.insert(format!("labels.{key}"), value.to_string());
            }
        }
    }
}
