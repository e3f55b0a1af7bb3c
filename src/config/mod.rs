//! Configuration types for the trajectory pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::processors::pipeline::DEFAULT_WINDOW_SIZE;

/// Configuration for trajectory loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Name of the array inside an `.npz` archive
    #[serde(default = "default_array_key")]
    pub array_key: String,
}

fn default_array_key() -> String {
    "path".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            array_key: default_array_key(),
        }
    }
}

/// Configuration for moving-average smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Number of samples averaged per output point
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

/// Configuration for nearest-segment queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Query point used when none is given on the command line
    #[serde(default)]
    pub query_point: Option<Vec<f64>>,
}

/// Configuration for PNG plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default = "default_plot_width")]
    pub width: u32,

    #[serde(default = "default_plot_height")]
    pub height: u32,

    /// Maximum points drawn per series
    #[serde(default = "default_plot_max_points")]
    pub max_points: usize,
}

fn default_plot_width() -> u32 {
    1280
}

fn default_plot_height() -> u32 {
    960
}

fn default_plot_max_points() -> usize {
    100_000
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_plot_width(),
            height: default_plot_height(),
            max_points: default_plot_max_points(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub projection: ProjectionConfig,

    #[serde(default)]
    pub plot: PlotConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.loader.array_key, "path");
        assert_eq!(config.smoothing.window_size, DEFAULT_WINDOW_SIZE);
        assert!(config.projection.query_point.is_none());
        assert_eq!(config.plot.width, 1280);
    }

    #[test]
    fn test_missing_window_size_matches_pipeline_default() {
        let config: PipelineConfig = serde_yaml::from_str("smoothing: {}\n").unwrap();
        assert_eq!(config.smoothing.window_size, DEFAULT_WINDOW_SIZE);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "smoothing:\n  window_size: 7\nprojection:\n  query_point: [5.0, 5.0]\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.smoothing.window_size, 7);
        assert_eq!(config.projection.query_point, Some(vec![5.0, 5.0]));
        assert_eq!(config.loader, LoaderConfig::default());
        assert_eq!(config.plot, PlotConfig::default());
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = PipelineConfig::default();
        config.loader.array_key = "route".to_string();
        config.to_yaml(&path).unwrap();

        let loaded = PipelineConfig::from_yaml(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
