use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Maximum config file size (1 MB) - prevents memory exhaustion from malformed files
const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-analyzer gating by id; absent analyzers default to enabled.
    #[serde(default)]
    pub analyzers: HashMap<String, bool>,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Thresholds {
    /// A single bind matching strictly more elements than this suggests delegation.
    #[serde(default = "default_delegation_matches")]
    pub delegation_matches: usize,

    /// Handler executions slower than this are noted on stderr.
    #[serde(default = "default_slow_handler_ms")]
    pub slow_handler_ms: u64,
}

fn default_delegation_matches() -> usize {
    2
}

fn default_slow_handler_ms() -> u64 {
    1
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            delegation_matches: default_delegation_matches(),
            slow_handler_ms: default_slow_handler_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Rows shown per ranked table.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Id/selector prefix of the report overlay's own DOM. Calls whose
    /// selector contains this prefix are never recorded - without the guard
    /// the overlay's own manipulation would recursively analyze itself.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_top_n() -> usize {
    10
}

fn default_namespace() -> String {
    "qperf-".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            namespace: default_namespace(),
        }
    }
}

impl Config {
    /// Load config from query-perf.toml in the given path, or return default
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the directory containing query-perf.toml
    ///
    /// # Errors
    ///
    /// Returns an error if the path doesn't exist or if the config file
    /// exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        // Validate path exists
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        // If path is a file, use its parent directory for config lookup
        let dir_path = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };

        let config_path = dir_path.join("query-perf.toml");
        if config_path.exists() {
            // Check file size before reading to prevent memory exhaustion
            let metadata = std::fs::metadata(&config_path)?;
            if metadata.len() > MAX_CONFIG_SIZE {
                anyhow::bail!(
                    "Config file too large ({} bytes, max {} bytes): {}",
                    metadata.len(),
                    MAX_CONFIG_SIZE,
                    config_path.display()
                );
            }

            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;

            // Validate analyzer ids against known analyzers
            Self::validate_analyzer_ids(&config);

            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Validate that configured analyzer ids exist, warning about unknown ones.
    fn validate_analyzer_ids(config: &Config) {
        use crate::analyzers::registry_ids;

        for id in config.analyzers.keys() {
            if !registry_ids().contains(&id.as_str()) {
                eprintln!(
                    "Warning: Unknown analyzer '{}' in query-perf.toml (will be ignored)",
                    id
                );
            }
        }
    }

    /// Whether an analyzer is enabled (absent ids default to enabled).
    pub fn analyzer_enabled(&self, id: &str) -> bool {
        self.analyzers.get(id).copied().unwrap_or(true)
    }

    /// Generate default TOML config
    pub fn default_toml() -> &'static str {
        r#"# query-perf configuration
# Docs: https://github.com/qperf/query-perf

[analyzers]
# Disable an analyzer by id:
# pseudo-class = false
# nested-id = false
# id-descendant = false
# id-child = false
# repeated-selector = false
# delegation = false
# submit-control = false

[thresholds]
delegation-matches = 2  # bind to more elements than this suggests delegation
slow-handler-ms = 1     # handler executions slower than this are logged

[report]
top-n = 10              # rows per ranked table
namespace = "qperf-"    # report overlay prefix, excluded from recording
"#
    }
}
