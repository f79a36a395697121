//! Config file loading and flag overlay.

use std::path::Path;

use anyhow::{Context, Result};
use giztoy_hclust::{Linkage, Metric};
use serde::{Deserialize, Serialize};

/// Configuration file format (YAML or JSON).
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkage: Option<Linkage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Resolved run settings.
#[derive(Debug)]
pub struct Settings {
    pub metric: Metric,
    pub linkage: Linkage,
    pub key: Option<String>,
}

/// Load a config file. `.json` is parsed as JSON, anything else as YAML.
pub fn load(path: &Path) -> Result<FileConfig> {
    let data = std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let cfg = match ext {
        "json" => serde_json::from_slice(&data)?,
        _ => serde_yaml::from_slice(&data)?,
    };
    Ok(cfg)
}

impl FileConfig {
    /// Applies command-line overrides on top of the file values.
    pub fn resolve(self, metric: Option<Metric>, linkage: Option<Linkage>, key: Option<String>) -> Settings {
        Settings {
            metric: metric.or(self.metric).unwrap_or_default(),
            linkage: linkage.or(self.linkage).unwrap_or_default(),
            key: key.or(self.key),
        }
    }
}
