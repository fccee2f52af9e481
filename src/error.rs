use serde::{Serialize, Deserialize};
use std::fmt;

use crate::storage::StoreError;

/// Unified error type for the Orbit crate.
/// Everything that can fail returns Result<T, OrbitError>.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrbitError {
    pub message: String,
    pub stage: String,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl OrbitError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        OrbitError {
            message: message.into(),
            stage: stage.to_string(),
            context: None,
            source: None,
        }
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for OrbitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for OrbitError {}

impl From<anyhow::Error> for OrbitError {
    fn from(err: anyhow::Error) -> Self {
        OrbitError::new(err.to_string(), "unknown").with_source("anyhow")
    }
}

impl From<std::io::Error> for OrbitError {
    fn from(err: std::io::Error) -> Self {
        OrbitError::new(format!("I/O error: {}", err), "io").with_source("std::io")
    }
}

impl From<serde_json::Error> for OrbitError {
    fn from(err: serde_json::Error) -> Self {
        OrbitError::new(format!("JSON error: {}", err), "json_parse").with_source("serde_json")
    }
}

impl From<toml::de::Error> for OrbitError {
    fn from(err: toml::de::Error) -> Self {
        OrbitError::new(format!("TOML error: {}", err), "config").with_source("toml")
    }
}

impl From<StoreError> for OrbitError {
    fn from(err: StoreError) -> Self {
        let key = err.key().map(str::to_string);
        let error = OrbitError::new(err.to_string(), "store").with_source("storage");
        match key {
            Some(key) => error.with_context(format!("key: {}", key)),
            None => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = OrbitError::new("Test error", "test_stage");
        assert_eq!(error.message, "Test error");
        assert_eq!(error.stage, "test_stage");
        assert!(error.context.is_none());
    }

    #[test]
    fn test_error_with_context() {
        let error = OrbitError::new("Test error", "test_stage")
            .with_context("Additional context");
        assert_eq!(error.context.as_deref(), Some("Additional context"));
    }

    #[test]
    fn test_error_display() {
        let error = OrbitError::new("Test error", "test_stage")
            .with_context("context")
            .with_source("source");
        let display = format!("{}", error);
        assert!(display.starts_with("[test_stage] Test error"));
        assert!(display.contains("(context: context)"));
        assert!(display.contains("(source: source)"));
    }

    #[test]
    fn test_store_error_carries_key() {
        let error: OrbitError = StoreError::InvalidKey { key: String::new() }.into();
        assert_eq!(error.stage, "store");
        assert_eq!(error.context.as_deref(), Some("key: "));
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let error: OrbitError = err.into();
        assert_eq!(error.stage, "json_parse");
        assert_eq!(error.source.as_deref(), Some("serde_json"));
    }
}
