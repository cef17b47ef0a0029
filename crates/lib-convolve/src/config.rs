//! Convolution configuration.
//!
//! All fields have defaults, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "exclude_non_finite": true, "empty_neighborhood": "error" }
//! ```

use crate::error::ConvolveResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How kernel positions outside the array are treated.
///
/// Only `Ignore` exists: out-of-bounds positions are dropped from both the
/// weighted sum and the normalization. Padding, wraparound and reflection
/// are not supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    #[default]
    Ignore,
}

/// What to produce when every neighbor of a position is excluded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyNeighborhood {
    /// Write NaN at that position.
    #[default]
    Nan,

    /// Fail the whole call with `ConvolveError::EmptyNeighborhood`.
    Error,
}

/// Threading strategy for evaluating output positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// Parallel once `positions * kernel_len` reaches
    /// [`PARALLEL_WORK_THRESHOLD`](crate::convolution::PARALLEL_WORK_THRESHOLD).
    #[default]
    Auto,

    /// Always single-threaded.
    Sequential,

    /// Always on the rayon thread pool.
    Parallel,
}

/// Options for masked convolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvolveConfig {
    /// Boundary policy.
    pub boundary: Boundary,

    /// Exclude NaN and infinite samples as if they were masked.
    pub exclude_non_finite: bool,

    /// Policy for positions without any valid neighbor.
    pub empty_neighborhood: EmptyNeighborhood,

    /// Multiply results by the kernel sum.
    ///
    /// Without rescaling the result is a weighted mean. With it the result
    /// has the magnitude of an unnormalized convolution.
    pub rescale_kernel: bool,

    /// Threading strategy.
    pub execution: Execution,
}

impl ConvolveConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> ConvolveResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ConvolveResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!("Loaded convolution config from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> ConvolveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_exclude_non_finite(mut self, exclude: bool) -> Self {
        self.exclude_non_finite = exclude;
        self
    }

    pub fn with_empty_neighborhood(mut self, policy: EmptyNeighborhood) -> Self {
        self.empty_neighborhood = policy;
        self
    }

    pub fn with_rescale_kernel(mut self, rescale: bool) -> Self {
        self.rescale_kernel = rescale;
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvolveError;

    #[test]
    fn test_defaults() {
        let config = ConvolveConfig::default();
        assert_eq!(config.boundary, Boundary::Ignore);
        assert!(!config.exclude_non_finite);
        assert_eq!(config.empty_neighborhood, EmptyNeighborhood::Nan);
        assert!(!config.rescale_kernel);
        assert_eq!(config.execution, Execution::Auto);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ConvolveConfig::from_json_str(
            r#"{ "exclude_non_finite": true, "empty_neighborhood": "error" }"#,
        )
        .unwrap();
        assert!(config.exclude_non_finite);
        assert_eq!(config.empty_neighborhood, EmptyNeighborhood::Error);
        assert_eq!(config.execution, Execution::Auto);

        let empty = ConvolveConfig::from_json_str("{}").unwrap();
        assert_eq!(empty, ConvolveConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = ConvolveConfig::default()
            .with_rescale_kernel(true)
            .with_execution(Execution::Sequential);
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"sequential\""));
        assert_eq!(ConvolveConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_unsupported_boundary_rejected() {
        for policy in ["reflect", "wrap", "fill", "extend"] {
            let json = format!(r#"{{ "boundary": "{}" }}"#, policy);
            let err = ConvolveConfig::from_json_str(&json).unwrap_err();
            assert!(matches!(err, ConvolveError::Json(_)), "{} accepted", policy);
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(ConvolveConfig::from_json_str(r#"{ "padding": 3 }"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ConvolveConfig::from_file("/nonexistent/convolve.json").unwrap_err();
        assert!(matches!(err, ConvolveError::Io(_)));
    }
}
