//! Configuration Management
//!
//! Handles persistent configuration storage for tfharvest.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Last used project ID
    #[serde(default)]
    pub project_id: Option<String>,
    /// Last used region
    #[serde(default)]
    pub region: Option<String>,
    /// Last requested resource kinds
    #[serde(default)]
    pub last_kinds: Vec<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tfharvest").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective project (CLI > config > gcloud default)
    pub fn effective_project(&self) -> String {
        self.project_id
            .clone()
            .or_else(crate::google::auth::get_default_project)
            .unwrap_or_default()
    }

    /// Get effective region (CLI > config > gcloud default)
    pub fn effective_region(&self) -> String {
        self.region
            .clone()
            .or_else(crate::google::auth::get_default_region)
            .unwrap_or_else(|| "us-central1".to_string())
    }

    /// Remember the last successful run's selection and save
    pub fn remember_run(&mut self, project_id: &str, region: &str, kinds: &[String]) -> Result<()> {
        self.project_id = Some(project_id.to_string());
        self.region = Some(region.to_string());
        self.last_kinds = kinds.to_vec();
        self.save()
    }
}
