//! Generator contract and run lifecycle
//!
//! A generator discovers one resource kind: it drives the provider API
//! through the pagination adapter, builds resources through the sink's
//! builder, and applies the failure-isolation tiers at each failure site.
//! [`GeneratorRun`] is the harness enforcing the lifecycle
//! `Created → Discovering → {Populated | Failed}` and the single
//! post-conversion pass (`Populated → Converted`); a finished run cannot be
//! driven again.

use super::context::ServiceContext;
use super::error::{Diagnostic, Diagnostics, DiscoveryError};
use super::resource::{Resource, ResourceBuilder};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Collects one run's resources and containment diagnostics. Owns the
/// builder so naming state stays scoped to the run.
pub struct DiscoverySink {
    builder: ResourceBuilder,
    resources: Vec<Resource>,
    diagnostics: Diagnostics,
}

impl DiscoverySink {
    pub fn new(provider: &str) -> Self {
        Self {
            builder: ResourceBuilder::new(provider),
            resources: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Build and collect a fully populated resource.
    pub fn emit(
        &mut self,
        id: &str,
        name: &str,
        kind: &str,
        attributes: BTreeMap<String, String>,
        allow_empty_values: &[&str],
        additional: HashMap<String, Value>,
    ) {
        let resource =
            self.builder
                .build(id, name, kind, attributes, allow_empty_values, additional);
        self.resources.push(resource);
    }

    /// Build and collect a resource with no attributes.
    pub fn emit_simple(&mut self, id: &str, name: &str, kind: &str) {
        let resource = self.builder.build_simple(id, name, kind);
        self.resources.push(resource);
    }

    /// Record a dropped item (skip-one-item tier).
    pub fn skip_item(&mut self, kind: &str, item: &str, error: &DiscoveryError) {
        self.diagnostics.item_skipped(kind, item, error);
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn into_parts(self) -> (Vec<Resource>, Diagnostics) {
        (self.resources, self.diagnostics)
    }
}

/// One resource kind's discovery unit.
///
/// `discover` must return an error only on a fatal event (a `Config` error
/// from the context, or a transport failure on the kind's first call);
/// everything else is contained through the sink. `post_convert` is the
/// optional hook run exactly once after a successful discovery.
#[async_trait]
pub trait ResourceGenerator: Send + Sync {
    /// The configuration resource type this generator produces.
    fn kind(&self) -> &'static str;

    /// The read-only context this generator was built with.
    fn context(&self) -> &ServiceContext;

    /// Populate the sink from the provider API.
    async fn discover(&self, sink: &mut DiscoverySink) -> Result<(), DiscoveryError>;

    /// Transform discovered resources in place before handoff.
    fn post_convert(&self, _resources: &mut Vec<Resource>) {}
}

/// Lifecycle phase of one generator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Discovering,
    Populated,
    Failed,
    Converted,
}

/// Everything one finished run hands to the caller.
#[derive(Debug)]
pub struct GeneratorOutcome {
    pub kind: String,
    pub resources: Vec<Resource>,
    pub diagnostics: Vec<Diagnostic>,
    /// The fatal error, when the run failed. A run with diagnostics but no
    /// error produced an incomplete-but-trustworthy collection.
    pub error: Option<DiscoveryError>,
}

impl GeneratorOutcome {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Harness owning one generator for one run.
pub struct GeneratorRun {
    generator: Box<dyn ResourceGenerator>,
    phase: Phase,
    resources: Vec<Resource>,
    diagnostics: Diagnostics,
    error: Option<DiscoveryError>,
}

impl GeneratorRun {
    pub fn new(generator: Box<dyn ResourceGenerator>) -> Self {
        Self {
            generator,
            phase: Phase::Created,
            resources: Vec::new(),
            diagnostics: Diagnostics::new(),
            error: None,
        }
    }

    pub fn kind(&self) -> &str {
        self.generator.kind()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the discovery phase. Refused unless the run is freshly created;
    /// a failed or populated run needs a fresh instance.
    pub async fn discover(&mut self) -> Result<(), DiscoveryError> {
        if self.phase != Phase::Created {
            return Err(DiscoveryError::InvalidState {
                kind: self.kind().to_string(),
            });
        }
        self.phase = Phase::Discovering;
        tracing::debug!(kind = self.kind(), "discovery started");

        let mut sink = DiscoverySink::new(self.generator.context().provider());
        match self.generator.discover(&mut sink).await {
            Ok(()) => {
                let (resources, diagnostics) = sink.into_parts();
                tracing::info!(
                    kind = self.kind(),
                    resources = resources.len(),
                    contained = diagnostics.events().len(),
                    "discovery finished"
                );
                self.resources = resources;
                self.diagnostics = diagnostics;
                self.phase = Phase::Populated;
                Ok(())
            }
            Err(err) => {
                tracing::error!(kind = self.kind(), %err, "discovery failed");
                self.phase = Phase::Failed;
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Run the post-conversion hook exactly once over a populated run.
    pub fn convert(&mut self) -> Result<(), DiscoveryError> {
        if self.phase != Phase::Populated {
            return Err(DiscoveryError::InvalidState {
                kind: self.kind().to_string(),
            });
        }
        self.generator.post_convert(&mut self.resources);
        self.phase = Phase::Converted;
        Ok(())
    }

    /// Consume the harness. Converted resources are read-only from here on.
    pub fn into_outcome(self) -> GeneratorOutcome {
        GeneratorOutcome {
            kind: self.generator.kind().to_string(),
            resources: self.resources,
            diagnostics: self.diagnostics.into_events(),
            error: self.error,
        }
    }
}

/// Drive independent generator runs concurrently. Each run owns its
/// collection; the only shared state is the read-only context, so no
/// locking is needed. Outcomes come back in input order.
pub async fn run_all(runs: Vec<GeneratorRun>) -> Vec<GeneratorOutcome> {
    let tasks = runs.into_iter().map(|mut run| async move {
        if run.discover().await.is_ok() {
            // Convert cannot be refused right after a successful discovery.
            let _ = run.convert();
        }
        run.into_outcome()
    });
    futures::future::join_all(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubGenerator {
        ctx: ServiceContext,
        fail: bool,
    }

    impl StubGenerator {
        fn new(fail: bool) -> Self {
            Self {
                ctx: ServiceContext::new("google").with_arg("project", "p"),
                fail,
            }
        }
    }

    #[async_trait]
    impl ResourceGenerator for StubGenerator {
        fn kind(&self) -> &'static str {
            "google_stub"
        }

        fn context(&self) -> &ServiceContext {
            &self.ctx
        }

        async fn discover(&self, sink: &mut DiscoverySink) -> Result<(), DiscoveryError> {
            if self.fail {
                return Err(DiscoveryError::transport("first call refused"));
            }
            sink.emit_simple("id-1", "one", self.kind());
            sink.emit_simple("id-2", "two", self.kind());
            Ok(())
        }

        fn post_convert(&self, resources: &mut Vec<Resource>) {
            for resource in resources {
                resource
                    .attributes
                    .insert("converted".to_string(), "yes".to_string());
            }
        }
    }

    #[tokio::test]
    async fn successful_run_walks_the_full_lifecycle() {
        let mut run = GeneratorRun::new(Box::new(StubGenerator::new(false)));
        assert_eq!(run.phase(), Phase::Created);

        run.discover().await.unwrap();
        assert_eq!(run.phase(), Phase::Populated);

        run.convert().unwrap();
        assert_eq!(run.phase(), Phase::Converted);

        let outcome = run.into_outcome();
        assert!(!outcome.is_failed());
        assert_eq!(outcome.resources.len(), 2);
        assert_eq!(outcome.resources[0].attributes.get("converted").unwrap(), "yes");
    }

    #[tokio::test]
    async fn failed_run_is_empty_and_not_restartable() {
        let mut run = GeneratorRun::new(Box::new(StubGenerator::new(true)));

        let err = run.discover().await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Transport { .. }));
        assert_eq!(run.phase(), Phase::Failed);

        // A finished run refuses another discovery.
        assert!(matches!(
            run.discover().await,
            Err(DiscoveryError::InvalidState { .. })
        ));

        let outcome = run.into_outcome();
        assert!(outcome.is_failed());
        assert!(outcome.resources.is_empty());
    }

    #[tokio::test]
    async fn convert_requires_a_populated_run() {
        let mut run = GeneratorRun::new(Box::new(StubGenerator::new(false)));
        assert!(matches!(
            run.convert(),
            Err(DiscoveryError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn run_all_preserves_input_order_and_isolates_failures() {
        let runs = vec![
            GeneratorRun::new(Box::new(StubGenerator::new(false))),
            GeneratorRun::new(Box::new(StubGenerator::new(true))),
        ];

        let outcomes = run_all(runs).await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].is_failed());
        assert_eq!(outcomes[0].resources.len(), 2);
        assert!(outcomes[1].is_failed());
        assert!(outcomes[1].resources.is_empty());
    }
}
