//! Pagination adapter
//!
//! Provider list APIs come in two shapes: a single bulk call, and a
//! cursor-driven "has more / advance" iterator. Both are adapted to one
//! narrow contract here: a [`PageSource`] produces a [`Page`] per token,
//! and a [`Paginator`] turns that into a lazy, finite, non-restartable
//! sequence of item batches. Nothing is buffered beyond the current batch;
//! each step is pulled on demand by the generator driving the walk.

use super::error::{Diagnostics, DiscoveryError};
use async_trait::async_trait;
use serde_json::Value;

/// One batch of raw items plus the continuation token, if any.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Value>,
    pub next: Option<String>,
}

impl Page {
    /// A terminal page.
    pub fn last(items: Vec<Value>) -> Self {
        Self { items, next: None }
    }

    /// A page with more to come.
    pub fn partial(items: Vec<Value>, token: impl Into<String>) -> Self {
        Self {
            items,
            next: Some(token.into()),
        }
    }
}

/// The stepping function a provider adapter implements. `token` is `None`
/// on the first call and the previous page's continuation token afterwards.
#[async_trait]
pub trait PageSource: Send {
    async fn fetch(&mut self, token: Option<&str>) -> Result<Page, DiscoveryError>;
}

enum WalkState {
    Start,
    Continuing(String),
    Finished,
}

/// Lazy walk over a [`PageSource`]. Not restartable: after an error or the
/// final page the walk stays finished, and resuming requires a fresh
/// source. Stale cursors are never reused.
pub struct Paginator<S> {
    source: S,
    state: WalkState,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: WalkState::Start,
        }
    }

    /// Pull the next batch: `Some(Ok(items))` while pages remain,
    /// `Some(Err(_))` if the step failed, `None` once the walk is done.
    pub async fn next_batch(&mut self) -> Option<Result<Vec<Value>, DiscoveryError>> {
        let token = match &self.state {
            WalkState::Start => None,
            WalkState::Continuing(token) => Some(token.clone()),
            WalkState::Finished => return None,
        };

        match self.source.fetch(token.as_deref()).await {
            Ok(page) => {
                self.state = match page.next {
                    Some(token) => WalkState::Continuing(token),
                    None => WalkState::Finished,
                };
                Some(Ok(page.items))
            }
            Err(err) => {
                self.state = WalkState::Finished;
                Some(Err(err))
            }
        }
    }

    /// Walk every page, applying the listing tier of the isolation policy:
    /// a failure on the first step is fatal and propagates; a failure on a
    /// later step stops the walk, records a partial-listing diagnostic for
    /// `kind`, and keeps everything already consumed.
    pub async fn drain(
        mut self,
        kind: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Value>, DiscoveryError> {
        let mut items = Vec::new();
        let mut first = true;

        while let Some(step) = self.next_batch().await {
            match step {
                Ok(batch) => items.extend(batch),
                Err(err) if first => return Err(err),
                Err(err) => {
                    diagnostics.partial_listing(kind, &err);
                    break;
                }
            }
            first = false;
        }

        Ok(items)
    }
}
