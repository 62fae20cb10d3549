//! Engine configuration loaded from TOML.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use course_model::ChapterMarkers;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding `data.file`.
pub const DATA_FILE_ENV: &str = "COURSE_GRAPH_DATA";

/// Depth used for node graphs when the caller gives none.
pub const DEFAULT_NODE_DEPTH: i32 = 2;

/// Engine configuration. Every section is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data: DataConfig,
    pub graph: GraphConfig,
    pub chapters: ChapterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path of the declarative source file.
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Depth of node graphs when the request has none.
    pub default_depth: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterConfig {
    /// Alias lists in rank order.
    pub markers: ChapterMarkers,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("data/knowledge_graph.cypher"),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_NODE_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env();
        Ok(config)
    }

    /// Load from `path` when given, otherwise start from defaults.
    /// Environment overrides apply in both cases.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Apply `COURSE_GRAPH_DATA` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(file) = env::var(DATA_FILE_ENV) {
            if !file.trim().is_empty() {
                self.data.file = PathBuf::from(file);
            }
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.graph.default_depth < 0 {
            return Err(Error::ConfigInvalid(format!(
                "graph.default_depth must be >= 0, got {}",
                self.graph.default_depth
            )));
        }

        if self.chapters.markers.is_empty() {
            return Err(Error::ConfigInvalid(
                "chapters.markers must list at least one unit".to_string(),
            ));
        }

        for (i, aliases) in self.chapters.markers.ranks().enumerate() {
            if aliases.is_empty() || aliases.iter().any(|alias| alias.trim().is_empty()) {
                return Err(Error::ConfigInvalid(format!(
                    "chapters.markers[{}] must contain only non-empty aliases",
                    i
                )));
            }
        }

        Ok(())
    }
}
