//! Pipeline configuration.
//!
//! Configuration is a plain value handed to a command or a rule validation
//! call. There is no process-wide setting.

use serde::{Deserialize, Serialize};

/// Default bound on nested rule batches.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings that shape how hooks are invoked and how deep rule trees may go.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// partial JSON document is enough:
///
/// ```rust
/// use rulebook::PipelineConfig;
///
/// let config: PipelineConfig = serde_json::from_str(r#"{ "auto_wrap": true }"#).unwrap();
/// assert!(config.auto_wrap);
/// assert_eq!(config.max_depth, rulebook::config::DEFAULT_MAX_DEPTH);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Accept plain, already computed hook returns as resolved values.
    ///
    /// When `false`, a hook answering with [`Invocation::value`](crate::Invocation::value)
    /// fails with [`PipelineError::NotAwaitable`](crate::PipelineError::NotAwaitable).
    pub auto_wrap: bool,

    /// Maximum nesting of successor and continuation batches.
    pub max_depth: usize,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_wrap(mut self, auto_wrap: bool) -> Self {
        self.auto_wrap = auto_wrap;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            auto_wrap: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_auto_wrap() {
        let config = PipelineConfig::default();
        assert!(!config.auto_wrap);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = PipelineConfig::new().with_auto_wrap(true).with_max_depth(3);
        assert!(config.auto_wrap);
        assert_eq!(config.max_depth, 3);
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
