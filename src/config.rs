use std::{
    env, fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SscError},
    ssc::{EncodeMode, DEFAULT_SIMILARITY_THRESHOLD},
};

const CONFIG_ENV: &str = "SSC_MATCH_CONFIG";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tab-separated confusion dictionary.
    pub dictionary_path: Option<PathBuf>,
    /// JSON stroke/structure/four-corner tables for the shape code.
    pub code_table_path: Option<PathBuf>,
    pub similarity_threshold: f64,
    pub encode_mode: EncodeMode,
    pub default_business: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dictionary_path: None,
            code_table_path: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            encode_mode: EncodeMode::default(),
            default_business: None,
        }
    }
}

impl AppConfig {
    /// Read the config file, falling back to defaults when it is missing or
    /// unreadable.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            debug!("no config at {:?}, using defaults", path);
            return Self::default();
        };
        match Self::from_json(&content) {
            Ok(config) => config,
            Err(err) => {
                warn!("failed to parse config {:?}: {err}", path);
                Self::default()
            }
        }
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        Ok(config.normalized())
    }

    /// Write the config to [`config_path`].
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path().ok_or(SscError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_error = |source: std::io::Error| SscError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let payload = serde_json::to_string_pretty(self).map_err(|source| SscError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, payload).map_err(io_error)?;
        debug!("wrote config {:?}", path);
        Ok(())
    }

    fn normalized(mut self) -> Self {
        let threshold = self.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            let clamped = if threshold.is_nan() {
                DEFAULT_SIMILARITY_THRESHOLD
            } else {
                threshold.clamp(0.0, 1.0)
            };
            warn!("similarity threshold {threshold} out of range, using {clamped}");
            self.similarity_threshold = clamped;
        }
        self
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    Some(dirs::config_dir()?.join("ssc-match").join(CONFIG_FILE))
}
