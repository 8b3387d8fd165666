// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Learning Configuration
//
// Every heuristic threshold and keyword list used by the learning loop lives
// here as named, overridable configuration:
// - store layout (observation log, instinct directories, evolved artifacts)
// - detector thresholds
// - confidence arithmetic
// - clustering similarity weights and stopping rule
// - evolution classifier keyword sets
//
// Every section is `#[serde(default)]`, so a partial YAML file only overrides
// the keys it names.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing at a config file
pub const CONFIG_PATH_ENV: &str = "HOMUNCULUS_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub paths: StorePaths,
    pub detection: DetectionConfig,
    pub confidence: ConfidenceConfig,
    pub clustering: ClusteringConfig,
    pub classifier: ClassifierConfig,
    pub listing: ListingConfig,
}

/// On-disk layout of the knowledge store. Only `root` is configurable; every
/// other location is derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorePaths {
    pub root: PathBuf,
}

impl Default for StorePaths {
    fn default() -> Self {
        let root = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".claude")
            .join("homunculus");
        Self { root }
    }
}

impl StorePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn observations_file(&self) -> PathBuf {
        self.root.join("observations.jsonl")
    }

    pub fn instincts_dir(&self) -> PathBuf {
        self.root.join("instincts")
    }

    /// Instincts learned locally; the only directory the analyzer writes.
    pub fn personal_dir(&self) -> PathBuf {
        self.instincts_dir().join("personal")
    }

    /// Instincts imported from elsewhere; read-only for this crate.
    pub fn inherited_dir(&self) -> PathBuf {
        self.instincts_dir().join("inherited")
    }

    pub fn evolved_dir(&self) -> PathBuf {
        self.root.join("evolved")
    }

    pub fn analysis_marker(&self) -> PathBuf {
        self.root.join(".last-analysis")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root.join(".lock")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.yaml")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Sliding window length for workflow sequences
    pub workflow_window: usize,
    pub workflow_min_count: u32,
    pub workflow_min_sessions: usize,
    /// A tool must exceed this share of all tool starts to count as preferred
    pub preference_min_ratio: f64,
    pub preference_min_count: u32,
    /// Observations inspected after an error for its resolution
    pub error_lookahead: usize,
    pub error_min_count: u32,
    /// Case-insensitive substrings marking a tool output as an error
    pub error_markers: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            workflow_window: 3,
            workflow_min_count: 3,
            workflow_min_sessions: 1,
            preference_min_ratio: 0.2,
            preference_min_count: 5,
            error_lookahead: 4,
            error_min_count: 2,
            error_markers: strings(&["error", "failed", "exception"]),
        }
    }
}

/// One step of the initial-confidence table: support counts up to and
/// including `max_count` start at `confidence`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStep {
    pub max_count: u32,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Added each time an existing instinct is detected again
    pub increment: f64,
    pub ceiling: f64,
    pub steps: Vec<ConfidenceStep>,
    /// Initial confidence for support counts beyond the last step
    pub top: f64,
    /// Evolved artifact boost per cluster member, up to `cluster_size_cap`
    pub cluster_size_boost: f64,
    pub cluster_size_cap: f64,
    /// Evolved artifact boost per backing observation, up to `cluster_observation_cap`
    pub cluster_observation_boost: f64,
    pub cluster_observation_cap: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            increment: 0.05,
            ceiling: 0.95,
            steps: vec![
                ConfidenceStep { max_count: 2, confidence: 0.3 },
                ConfidenceStep { max_count: 5, confidence: 0.5 },
                ConfidenceStep { max_count: 10, confidence: 0.7 },
            ],
            top: 0.85,
            cluster_size_boost: 0.02,
            cluster_size_cap: 0.1,
            cluster_observation_boost: 0.005,
            cluster_observation_cap: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Merging stops once the best average-linkage similarity drops below this
    pub similarity_threshold: f64,
    /// Clusters smaller than this are not evolved
    pub min_cluster_size: usize,
    pub domain_weight: f64,
    pub trigger_word_weight: f64,
    pub trigger_cap: f64,
    pub action_word_weight: f64,
    pub action_cap: f64,
    /// Shared words must be longer than this to count
    pub min_word_len: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.4,
            min_cluster_size: 3,
            domain_weight: 0.4,
            trigger_word_weight: 0.1,
            trigger_cap: 0.3,
            action_word_weight: 0.05,
            action_cap: 0.3,
            min_word_len: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub command_indicators: Vec<String>,
    pub agent_indicators: Vec<String>,
    pub skill_indicators: Vec<String>,
    /// Words never used when naming an evolved artifact
    pub name_stopwords: Vec<String>,
    /// Action words must be longer than this to name an artifact
    pub name_min_word_len: usize,
    pub name_max_len: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            command_indicators: strings(&[
                "when user asks",
                "when creating",
                "when starting",
                "run",
                "execute",
                "generate",
            ]),
            agent_indicators: strings(&[
                "debug",
                "investigate",
                "analyze",
                "research",
                "refactor",
                "review",
                "multi-step",
            ]),
            skill_indicators: strings(&[
                "when writing",
                "when editing",
                "pattern",
                "style",
                "prefer",
                "avoid",
                "always",
                "never",
            ]),
            name_stopwords: strings(&["when", "then", "should", "always", "never", "using", "with"]),
            name_min_word_len: 4,
            name_max_len: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub min_confidence: f64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { min_confidence: 0.5 }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl LearningConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| crate::CortexError::io(path, e))?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml_string(&self) -> crate::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. HOMUNCULUS_CONFIG_PATH environment variable
    /// 2. ./homunculus-config.yaml (working directory)
    /// 3. <store root>/config.yaml
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./homunculus-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        let store_config = StorePaths::default().config_file();
        if store_config.exists() {
            return Some(store_config);
        }

        None
    }

    /// Load from an explicit path (must succeed), a discovered path, or
    /// defaults; environment overrides are applied last.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> crate::Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            Self::from_yaml_file(&path)?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            match Self::from_yaml_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable configuration {:?}: {}", path, e);
                    Self::default()
                }
            }
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides. Unparseable numeric values keep
    /// the current setting.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("HOMUNCULUS_ROOT") {
            if !root.is_empty() {
                self.paths.root = PathBuf::from(root);
            }
        }
        if let Ok(val) = std::env::var("HOMUNCULUS_MIN_CLUSTER_SIZE") {
            self.clustering.min_cluster_size = parse_or_default(
                "HOMUNCULUS_MIN_CLUSTER_SIZE",
                &val,
                self.clustering.min_cluster_size,
            );
        }
        if let Ok(val) = std::env::var("HOMUNCULUS_SIMILARITY_THRESHOLD") {
            self.clustering.similarity_threshold = parse_or_default(
                "HOMUNCULUS_SIMILARITY_THRESHOLD",
                &val,
                self.clustering.similarity_threshold,
            );
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |reason: String| crate::CortexError::InvalidDocument {
            path: PathBuf::from("<config>"),
            reason,
        };

        if self.detection.workflow_window == 0 {
            return Err(invalid("detection.workflow_window must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.detection.preference_min_ratio) {
            return Err(invalid(format!(
                "detection.preference_min_ratio {} is outside [0, 1]",
                self.detection.preference_min_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence.ceiling) {
            return Err(invalid(format!(
                "confidence.ceiling {} is outside [0, 1]",
                self.confidence.ceiling
            )));
        }
        if self.confidence.increment < 0.0 {
            return Err(invalid("confidence.increment must not be negative".into()));
        }
        if self
            .confidence
            .steps
            .windows(2)
            .any(|w| w[0].max_count >= w[1].max_count)
        {
            return Err(invalid("confidence.steps must be ordered by max_count".into()));
        }
        if self.clustering.min_cluster_size == 0 {
            return Err(invalid("clustering.min_cluster_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Parse a numeric setting, falling back to `default` with a warning.
pub fn parse_or_default<T>(name: &str, raw: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(setting = name, value = raw, %default, "Unparseable value, using default");
            default
        }
    }
}
