//! Normalized resource entity and its builder
//!
//! A [`Resource`] is the canonical representation of one discovered cloud
//! object, the sole contract handed to the configuration renderer. The
//! [`ResourceBuilder`] owns the per-run naming state: it sanitizes reference
//! names into valid Terraform identifiers and disambiguates collisions
//! deterministically.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One discovered cloud object, normalized for configuration generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Provider-native unique id. May be empty when not yet known.
    pub id: String,
    /// Sanitized reference name, unique per `kind` within one run.
    pub name: String,
    /// Target configuration resource type, e.g. `google_storage_bucket`.
    pub kind: String,
    /// Owning provider name.
    pub provider: String,
    /// Attribute map. Ordered so one run's output is deterministic; keys are
    /// stable across all resources of the same `kind` within a run.
    pub attributes: BTreeMap<String, String>,
    /// Attribute names, or `prefix.` patterns, that the renderer emits even
    /// when the value is the zero value.
    pub allow_empty_values: Vec<String>,
    /// Open-ended metadata consumed only by the renderer.
    pub additional: HashMap<String, serde_json::Value>,
}

impl Resource {
    /// Whether `key` may be emitted with a zero value. A pattern matches on
    /// equality, or as a prefix when the key extends it (so `labels.`
    /// covers every flattened label).
    pub fn allows_empty(&self, key: &str) -> bool {
        self.allow_empty_values
            .iter()
            .any(|pattern| key == pattern || key.starts_with(pattern.as_str()))
    }

    /// Attributes after applying the renderer's zero-value contract:
    /// empty values are elided unless allow-listed.
    pub fn emittable_attributes(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .filter(|(key, value)| !value.is_empty() || self.allows_empty(key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Rewrite `raw` into a valid configuration identifier: every character
/// outside `[A-Za-z0-9_]` becomes `_`, and a leading digit gets a `_`
/// prefix. Empty input becomes `_`.
pub fn sanitize_name(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() {
        out.push('_');
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Per-run resource constructor. Owned by one generator; tracks every
/// `(kind, name)` it has produced so collisions can be resolved the same
/// way on every run.
#[derive(Debug)]
pub struct ResourceBuilder {
    provider: String,
    seen: HashSet<(String, String)>,
}

impl ResourceBuilder {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            seen: HashSet::new(),
        }
    }

    /// Build a fully populated resource.
    pub fn build(
        &mut self,
        id: &str,
        name: &str,
        kind: &str,
        attributes: BTreeMap<String, String>,
        allow_empty_values: &[&str],
        additional: HashMap<String, serde_json::Value>,
    ) -> Resource {
        let name = self.unique_name(kind, name, id);
        Resource {
            id: id.to_string(),
            name,
            kind: kind.to_string(),
            provider: self.provider.clone(),
            attributes,
            allow_empty_values: allow_empty_values.iter().map(|s| s.to_string()).collect(),
            additional,
        }
    }

    /// Build a resource with no attributes.
    pub fn build_simple(&mut self, id: &str, name: &str, kind: &str) -> Resource {
        self.build(id, name, kind, BTreeMap::new(), &[], HashMap::new())
    }

    /// Sanitize `raw` and resolve collisions within `kind`: first with a
    /// suffix derived from the identifier, then with an ordinal. Given the
    /// same build order this is deterministic across runs.
    fn unique_name(&mut self, kind: &str, raw: &str, id: &str) -> String {
        let base = sanitize_name(raw);
        let mut candidate = base.clone();

        if self.is_taken(kind, &candidate) && !id.is_empty() {
            candidate = format!("{}_{}", base, sanitize_name(id));
        }
        let mut ordinal = 2u32;
        while self.is_taken(kind, &candidate) {
            candidate = format!("{}_{}", base, ordinal);
            ordinal += 1;
        }

        self.seen.insert((kind.to_string(), candidate.clone()));
        candidate
    }

    fn is_taken(&self, kind: &str, name: &str) -> bool {
        self.seen.contains(&(kind.to_string(), name.to_string()))
    }
}
