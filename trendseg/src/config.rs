use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::constant::EngineError;

/// Explicit engine configuration, passed in by the caller, never global.
///
/// Default constants are documented decisions (see DESIGN.md): the original
/// heuristic's numeric values are not recoverable, so these are chosen to be
/// explicit and testable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Regions shorter than this many bars are discarded, not emitted.
    #[serde(default = "default_min_segment_len")]
    pub min_segment_len: usize,
    /// Relative tolerance around the rolling reference price while a region
    /// is open.
    #[serde(default = "default_reference_tolerance")]
    pub reference_tolerance: f64,
    /// Relative tolerance for trimming leading/trailing bars that violate the
    /// directional predicate.
    #[serde(default = "default_trim_tolerance")]
    pub trim_tolerance: f64,
    /// Named in-region fallback ratio, applied to both directions. Carried
    /// from the historical 60% heuristic; overridable, not a literal.
    #[serde(default = "default_fallback_ratio")]
    pub fallback_ratio: f64,
}

fn default_min_segment_len() -> usize {
    5
}

fn default_reference_tolerance() -> f64 {
    0.005
}

fn default_trim_tolerance() -> f64 {
    0.01
}

fn default_fallback_ratio() -> f64 {
    0.6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_segment_len: default_min_segment_len(),
            reference_tolerance: default_reference_tolerance(),
            trim_tolerance: default_trim_tolerance(),
            fallback_ratio: default_fallback_ratio(),
        }
    }
}

impl EngineConfig {
    /// Loads a config from a JSON or YAML file by extension. Missing fields
    /// fall back to the code defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        let config: EngineConfig = match path.extension().and_then(|x| x.to_str()) {
            Some("json") => {
                let value: JsonValue = serde_json::from_str(&text)
                    .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
                serde_json::from_value(value)
                    .map_err(|e| EngineError::InvalidConfig(e.to_string()))?
            }
            Some("yaml") | Some("yml") => {
                let value: YamlValue = serde_yaml::from_str(&text)
                    .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
                serde_yaml::from_value(value)
                    .map_err(|e| EngineError::InvalidConfig(e.to_string()))?
            }
            _ => {
                return Err(EngineError::InvalidConfig(format!(
                    "unsupported config file format: {}",
                    path.display()
                )));
            }
        };
        Ok(config)
    }
}
