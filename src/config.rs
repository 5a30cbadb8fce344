//! Tunable parameters for a labeling run.
//!
//! A config can be built in code, starting from [`AnalysisConfig::new`], or read from a JSON file. Fields missing
//! from the file take their defaults:
//!
//! ```json
//! { "clusters": 3, "seed": 42, "on_decode_error": "skip", "threads": 4 }
//! ```

use crate::{
    error::Error,
    filter::DEFAULT_EXTENSIONS,
    kmeans::{KMeans, DEFAULT_ATTEMPTS, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS},
    Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with an image that cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeFailurePolicy {
    /// Stop the whole batch at the first undecodable image.
    #[default]
    Abort,
    /// Log a warning, record the failure and carry on with the remaining images.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of k-means clusters used for the dominant color
    pub clusters: usize,

    /// Independent k-means initializations per image
    pub attempts: usize,

    /// Iteration limit of a single k-means attempt
    pub max_iterations: usize,

    /// Centroid movement below which an attempt has converged
    pub epsilon: f64,

    /// Seed for k-means initialization. Unseeded runs draw from system entropy.
    pub seed: Option<u64>,

    /// Accepted file name suffixes
    pub extensions: Vec<String>,

    pub on_decode_error: DecodeFailurePolicy,

    /// Worker threads; 1 processes images sequentially
    pub threads: usize,
}

impl AnalysisConfig {
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&content).map_err(|e| e.context(path.display().to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    /// The clusterer described by this config
    pub fn kmeans(&self) -> KMeans {
        KMeans::new(self.clusters)
            .attempts(self.attempts)
            .max_iterations(self.max_iterations)
            .epsilon(self.epsilon)
    }

    /// Reject parameters that would fail every image, before any image is read
    pub fn validate(&self) -> Result<()> {
        self.kmeans().validate()?;

        if self.threads < 1 {
            return Err(Error::invalid_parameter("threads", self.threads));
        }

        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            clusters: 1,
            attempts: DEFAULT_ATTEMPTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
            seed: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            on_decode_error: DecodeFailurePolicy::Abort,
            threads: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_reference_behavior() {
        let config = AnalysisConfig::new(2);

        assert_eq!(config.clusters, 2);
        assert_eq!(config.attempts, 10);
        assert_eq!(config.max_iterations, 200);
        assert_eq!(config.epsilon, 0.1);
        assert_eq!(config.extensions, vec!["jpg", "jpeg", "png", "bmp"]);
        assert_eq!(config.on_decode_error, DecodeFailurePolicy::Abort);
        assert_eq!(config.threads, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = AnalysisConfig::from_json(r#"{ "clusters": 3, "seed": 42, "on_decode_error": "skip" }"#).unwrap();

        assert_eq!(config.clusters, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.on_decode_error, DecodeFailurePolicy::Skip);
        assert_eq!(config.attempts, 10);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            AnalysisConfig::from_json("{ clusters: 3 }"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("color-labeler-config-{}.json", std::process::id()));
        let config = AnalysisConfig {
            seed: Some(9),
            threads: 3,
            ..AnalysisConfig::new(4)
        };

        config.to_json_file(&path).unwrap();
        assert_eq!(AnalysisConfig::from_json_file(&path).unwrap(), config);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn rejects_zero_clusters_and_threads() {
        assert!(matches!(
            AnalysisConfig::new(0).validate(),
            Err(Error::InvalidClusterCount { requested: 0, .. })
        ));

        let config = AnalysisConfig {
            threads: 0,
            ..AnalysisConfig::new(1)
        };
        assert!(matches!(config.validate(), Err(Error::InvalidParameter { .. })));
    }
}
