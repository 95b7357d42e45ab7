//! Renderer handoff
//!
//! Serializes finished generator outcomes into the manifest the external
//! renderer consumes. Attribute filtering applies the zero-value contract
//! here so the renderer never has to re-derive it.

use crate::core::{GeneratorOutcome, Resource};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// The manifest handed to the renderer.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub provider: String,
    pub project: String,
    pub generated_at: String,
    pub resources: Vec<ManifestResource>,
}

/// One normalized resource as the renderer sees it.
#[derive(Debug, Serialize)]
pub struct ManifestResource {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub provider: String,
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub additional: HashMap<String, serde_json::Value>,
}

impl From<&Resource> for ManifestResource {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.clone(),
            name: resource.name.clone(),
            kind: resource.kind.clone(),
            provider: resource.provider.clone(),
            attributes: resource.emittable_attributes(),
            additional: resource.additional.clone(),
        }
    }
}

impl Manifest {
    /// Assemble the manifest from finished outcomes, preserving each
    /// generator's resource order. Failed generators contribute nothing.
    pub fn from_outcomes(provider: &str, project: &str, outcomes: &[GeneratorOutcome]) -> Self {
        let resources = outcomes
            .iter()
            .flat_map(|outcome| outcome.resources.iter().map(ManifestResource::from))
            .collect();

        Self {
            provider: provider.to_string(),
            project: project.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            resources,
        }
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write manifest to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResourceBuilder;

    #[test]
    fn manifest_applies_the_zero_value_contract() {
        let mut builder = ResourceBuilder::new("google");
        let mut attributes = BTreeMap::new();
        attributes.insert("labels.env".to_string(), String::new());
        attributes.insert("description".to_string(), String::new());
        attributes.insert("location".to_string(), "US".to_string());
        let resource = builder.build(
            "id",
            "bucket",
            "google_storage_bucket",
            attributes,
            &["labels."],
            HashMap::new(),
        );

        let outcome = GeneratorOutcome {
            kind: "google_storage_bucket".to_string(),
            resources: vec![resource],
            diagnostics: vec![],
            error: None,
        };

        let manifest = Manifest::from_outcomes("google", "my-project", &[outcome]);
        let attributes = &manifest.resources[0].attributes;
        assert!(attributes.contains_key("labels.env"));
        assert!(attributes.contains_key("location"));
        assert!(!attributes.contains_key("description"));
    }

    #[test]
    fn failed_outcomes_contribute_no_resources() {
        let outcome = GeneratorOutcome {
            kind: "google_compute_network".to_string(),
            resources: vec![],
            diagnostics: vec![],
            error: Some(crate::core::DiscoveryError::transport("down")),
        };

        let manifest = Manifest::from_outcomes("google", "p", &[outcome]);
        assert!(manifest.resources.is_empty());
    }
}
