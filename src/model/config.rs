use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::status::Platform;

/// Error type for editor configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse editor config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Editor configuration, loaded from TOML.
///
/// Everything has a sensible default so an empty file (or no file at all)
/// yields a working setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

/// Options for the AI suggestion backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// How many title variants to request per suggestion call.
    /// The first one backs the title draft; the rest are for pickers.
    #[serde(default = "default_title_variants")]
    pub title_variants: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            title_variants: default_title_variants(),
        }
    }
}

fn default_title_variants() -> usize {
    3
}

/// Options for publication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Platforms to push to when the caller does not name any
    #[serde(default = "default_platforms")]
    pub default_platforms: Vec<Platform>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            default_platforms: default_platforms(),
        }
    }
}

fn default_platforms() -> Vec<Platform> {
    vec![Platform::Blog]
}

impl EditorConfig {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<EditorConfig, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<EditorConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        EditorConfig::from_toml(&text)
    }
}
