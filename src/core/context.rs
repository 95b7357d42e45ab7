//! Per-run service context
//!
//! A [`ServiceContext`] is the immutable bundle of configuration every
//! generator of a provider shares: the provider name plus a named-argument
//! bag (project, region, zone, ...). Accessors project the bag into typed
//! values and fail with a `Config` error when an argument is absent or has
//! the wrong shape.

use super::error::DiscoveryError;
use std::collections::HashMap;

/// A value in the named-argument bag.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    List(Vec<String>),
    Json(serde_json::Value),
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Read-only configuration shared by all generators of one provider.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    provider: String,
    args: HashMap<String, ArgValue>,
}

impl ServiceContext {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            args: HashMap::new(),
        }
    }

    /// Add a named argument. Construction-time only; the context is
    /// read-only once handed to generators.
    pub fn with_arg(mut self, key: &str, value: impl Into<ArgValue>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// String argument, or a `Config` error naming the key.
    pub fn str_arg(&self, key: &str) -> Result<&str, DiscoveryError> {
        match self.args.get(key) {
            Some(ArgValue::Str(s)) => Ok(s),
            Some(_) => Err(DiscoveryError::config(key, "expected a string")),
            None => Err(DiscoveryError::config(key, "missing")),
        }
    }

    /// String argument if present and well-shaped.
    pub fn opt_str_arg(&self, key: &str) -> Option<&str> {
        match self.args.get(key) {
            Some(ArgValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// List argument, or a `Config` error naming the key.
    pub fn list_arg(&self, key: &str) -> Result<&[String], DiscoveryError> {
        match self.args.get(key) {
            Some(ArgValue::List(values)) => Ok(values),
            Some(_) => Err(DiscoveryError::config(key, "expected a list")),
            None => Err(DiscoveryError::config(key, "missing")),
        }
    }

    /// JSON argument, or a `Config` error naming the key.
    pub fn json_arg(&self, key: &str) -> Result<&serde_json::Value, DiscoveryError> {
        match self.args.get(key) {
            Some(ArgValue::Json(value)) => Ok(value),
            Some(_) => Err(DiscoveryError::config(key, "expected a JSON value")),
            None => Err(DiscoveryError::config(key, "missing")),
        }
    }
}
