//! Discovery error taxonomy and containment diagnostics
//!
//! Fatal conditions (`Config`, a first-call `Transport`) propagate out of a
//! generator's discovery phase. Everything else is contained at the failure
//! site and recorded as a [`Diagnostic`] so callers can tell a complete run
//! from a degraded one.

use thiserror::Error;

/// Errors that can surface while discovering resources.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// A named argument is missing from the service context or has the
    /// wrong shape. Always fatal for the generator that hit it.
    #[error("missing or malformed argument `{key}`: {reason}")]
    Config { key: String, reason: String },

    /// Network, auth, or non-2xx API failure.
    #[error("transport failure: {detail}")]
    Transport { detail: String },

    /// The provider reported that the requested object does not exist.
    ///
    /// On a per-item enrichment call this is benign absence: the item is
    /// kept, the attribute is omitted, and nothing is logged.
    #[error("resource does not exist")]
    NotFound,

    /// A generator run was driven outside its lifecycle (e.g. a second
    /// `discover()` on a finished run).
    #[error("generator for `{kind}` is not in a runnable state")]
    InvalidState { kind: String },
}

impl DiscoveryError {
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// True for a recognized "does not exist" response.
    pub fn is_benign_absence(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// A containment event recorded during one generator run.
///
/// Diagnostics never carry benign absence; that outcome is invisible by
/// design of the isolation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A cursor advance failed after at least one page was consumed.
    /// Batches already consumed were kept.
    PartialListing { kind: String, detail: String },
    /// A single item was dropped because its enrichment lookup failed.
    ItemSkipped {
        kind: String,
        item: String,
        detail: String,
    },
}

/// Per-run diagnostic log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mid-pagination failure.
    pub fn partial_listing(&mut self, kind: &str, error: &DiscoveryError) {
        tracing::warn!(kind, %error, "listing stopped early, keeping pages already fetched");
        self.events.push(Diagnostic::PartialListing {
            kind: kind.to_string(),
            detail: error.to_string(),
        });
    }

    /// Record a dropped item.
    pub fn item_skipped(&mut self, kind: &str, item: &str, error: &DiscoveryError) {
        tracing::warn!(kind, item, %error, "skipping item after enrichment failure");
        self.events.push(Diagnostic::ItemSkipped {
            kind: kind.to_string(),
            item: item.to_string(),
            detail: error.to_string(),
        });
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<Diagnostic> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benign_absence_is_only_not_found() {
        assert!(DiscoveryError::NotFound.is_benign_absence());
        assert!(!DiscoveryError::transport("boom").is_benign_absence());
        assert!(!DiscoveryError::config("region", "missing").is_benign_absence());
    }

    #[test]
    fn diagnostics_accumulate_in_order() {
        let mut diags = Diagnostics::new();
        diags.partial_listing("google_storage_bucket", &DiscoveryError::transport("503"));
        diags.item_skipped(
            "google_storage_bucket",
            "bucket-a",
            &DiscoveryError::transport("timeout"),
        );

        assert_eq!(diags.events().len(), 2);
        assert!(matches!(
            diags.events()[0],
            Diagnostic::PartialListing { .. }
        ));
        assert!(matches!(diags.events()[1], Diagnostic::ItemSkipped { .. }));
    }
}
