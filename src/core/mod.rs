//! Provider-agnostic discovery pipeline
//!
//! This module holds the core contracts every provider implementation
//! builds on:
//!
//! - [`resource`] - the normalized resource entity and its builder
//! - [`context`] - the read-only per-run service context
//! - [`page`] - the pagination adapter unifying provider list APIs
//! - [`error`] - the error taxonomy and containment diagnostics
//! - [`generator`] - the per-kind generator contract and run lifecycle
//! - [`transform`] - the post-conversion transform pipeline

pub mod context;
pub mod error;
pub mod generator;
pub mod page;
pub mod resource;
pub mod transform;

pub use context::{ArgValue, ServiceContext};
pub use error::{Diagnostic, Diagnostics, DiscoveryError};
pub use generator::{
    run_all, DiscoverySink, GeneratorOutcome, GeneratorRun, Phase, ResourceGenerator,
};
pub use page::{Page, PageSource, Paginator};
pub use resource::{sanitize_name, Resource, ResourceBuilder};
pub use transform::{escape_interpolation, Transform, TransformPipeline};
