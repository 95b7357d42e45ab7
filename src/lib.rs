//! tfharvest - discover live Google Cloud resources and normalize them
//! into Terraform-ready resource descriptions.
//!
//! # Architecture
//!
//! - [`core`] - the provider-agnostic pipeline: resource entity + builder,
//!   service context, pagination adapter, failure-isolation policy,
//!   generator lifecycle, and post-conversion transforms
//! - [`google`] - the Google Cloud provider: auth, REST client, and one
//!   generator per resource kind
//! - [`manifest`] - the normalized JSON handoff to the renderer
//! - [`config`] - persistent user configuration
//!
//! # Example
//!
//! ```ignore
//! use tfharvest::core::{run_all, GeneratorRun, ServiceContext};
//! use tfharvest::google::{self, client::GoogleClient, registry};
//!
//! async fn discover_buckets() -> anyhow::Result<()> {
//!     let client = GoogleClient::new("my-project").await?;
//!     let ctx = ServiceContext::new(google::PROVIDER_NAME)
//!         .with_arg("project", "my-project")
//!         .with_arg("region", "us-central1");
//!     let generator = registry::generator_for("google_storage_bucket", &ctx, &client).unwrap();
//!     let outcomes = run_all(vec![GeneratorRun::new(generator)]).await;
//!     println!("{} resources", outcomes[0].resources.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod google;
pub mod manifest;
