//! Google Cloud authentication
//!
//! Handles authentication using Application Default Credentials (ADC),
//! service account keys, or gcloud CLI credentials, with an in-process
//! token cache. A static-token source exists for tests and CI.

use crate::core::DiscoveryError;
use gcp_auth::TokenProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for read-only discovery.
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform.read-only"];

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
enum CredentialSource {
    Adc(Arc<dyn TokenProvider>),
    Static(String),
}

/// Credentials holder with token caching.
#[derive(Clone)]
pub struct GoogleCredentials {
    source: CredentialSource,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl GoogleCredentials {
    /// Create credentials using Application Default Credentials.
    pub async fn new() -> Result<Self, DiscoveryError> {
        let provider = gcp_auth::provider().await.map_err(|err| {
            DiscoveryError::transport(format!(
                "failed to initialize Google authentication \
                 (run 'gcloud auth application-default login'): {err}"
            ))
        })?;

        Ok(Self {
            source: CredentialSource::Adc(provider),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Credentials with a fixed token. For tests and CI environments where
    /// no ADC is available.
    pub fn with_token(token: &str) -> Self {
        Self {
            source: CredentialSource::Static(token.to_string()),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls, refreshing the cache when the
    /// held token is about to expire.
    pub async fn get_token(&self) -> Result<String, DiscoveryError> {
        let provider = match &self.source {
            CredentialSource::Static(token) => return Ok(token.clone()),
            CredentialSource::Adc(provider) => provider,
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("cached token expired, fetching new token");
            }
        }

        let token = provider.token(DEFAULT_SCOPES).await.map_err(|err| {
            DiscoveryError::transport(format!("failed to get access token: {err}"))
        })?;
        let token_str = token.as_str().to_string();

        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;
        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at,
            });
        }

        Ok(token_str)
    }

    /// Force refresh the token.
    pub async fn refresh_token(&self) -> Result<String, DiscoveryError> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }
        self.get_token().await
    }
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    // Check CLOUDSDK_CONFIG environment variable first
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // Default to ~/.config/gcloud on Linux/macOS
    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    let mut chars = project.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Read the default project from the environment or gcloud configuration.
/// Validates the project ID format before returning.
pub fn get_default_project() -> Option<String> {
    for var in [
        "CLOUDSDK_CORE_PROJECT",
        "GOOGLE_CLOUD_PROJECT",
        "GCLOUD_PROJECT",
    ] {
        if let Ok(project) = std::env::var(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("invalid project ID format in {var}");
        }
    }

    let config_dir = get_gcloud_config_dir()?;
    read_active_config_value(&config_dir, "core", "project")
        .filter(|project| validate_project_id(project))
}

/// Get the default region from the environment or gcloud configuration.
pub fn get_default_region() -> Option<String> {
    if let Ok(region) = std::env::var("CLOUDSDK_COMPUTE_REGION") {
        return Some(region);
    }

    let config_dir = get_gcloud_config_dir()?;
    read_active_config_value(&config_dir, "compute", "region")
}

/// Read one `key` from a `[section]` of the active gcloud configuration.
fn read_active_config_value(config_dir: &PathBuf, section: &str, key: &str) -> Option<String> {
    let active_config_path = config_dir.join("active_config");
    let active_config = std::fs::read_to_string(&active_config_path).ok()?;
    let config_name = active_config.trim();

    // Validate config name to prevent path traversal
    if !config_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        tracing::warn!("invalid characters in active_config name");
        return None;
    }

    let config_path = config_dir
        .join("configurations")
        .join(format!("config_{}", config_name));
    let content = std::fs::read_to_string(&config_path).ok()?;

    let header = format!("[{section}]");
    let mut in_section = false;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line == header {
            in_section = true;
        } else if line.starts_with('[') {
            in_section = false;
        } else if in_section && line.starts_with(key) && line.contains('=') {
            if let Some(value) = line.split('=').nth(1) {
                return Some(value.trim().to_string());
            }
        }
    }

    None
}
