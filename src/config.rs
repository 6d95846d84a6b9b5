//! Export configuration.
//!
//! Every tunable of the pipeline lives here with its engine-agreed default.
//! Values can come from an `export.toml` file, with CLI flags overriding
//! individual fields.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::basis::{Basis, DEFAULT_SCALE};

/// Bone the engine attaches the head to
pub const DEFAULT_HEAD_JOINT: &str = "Neck";

/// Bone influences kept per vertex
pub const DEFAULT_WEIGHTS_PER_VERTEX: usize = 3;

/// Export settings (export.toml)
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Name of the head-attachment bone
    pub head_joint: String,
    /// Uniform source-to-engine scale baked into the basis
    pub scale: f32,
    /// Bone influences kept per vertex
    pub weights_per_vertex: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            head_joint: DEFAULT_HEAD_JOINT.to_string(),
            scale: DEFAULT_SCALE,
            weights_per_vertex: DEFAULT_WEIGHTS_PER_VERTEX,
        }
    }
}

impl ExportConfig {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {path:?}"))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("Failed to parse config: {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.weights_per_vertex == 0 {
            bail!("weights_per_vertex must be at least 1");
        }
        if self.scale <= 0.0 {
            bail!("scale must be positive, got {}", self.scale);
        }
        if self.head_joint.is_empty() {
            bail!("head_joint must not be empty");
        }
        Ok(())
    }

    /// The basis map this configuration implies
    pub fn basis(&self) -> Basis {
        Basis::with_scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_engine_contract() {
        let config = ExportConfig::default();
        assert_eq!(config.head_joint, "Neck");
        assert_eq!(config.weights_per_vertex, 3);
        assert!((config.scale - 0.00254).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: ExportConfig = toml::from_str("head_joint = \"Head\"").unwrap();
        assert_eq!(config.head_joint, "Head");
        assert_eq!(config.weights_per_vertex, DEFAULT_WEIGHTS_PER_VERTEX);
    }

    #[test]
    fn zero_weight_count_is_rejected() {
        let config: ExportConfig = toml::from_str("weights_per_vertex = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
