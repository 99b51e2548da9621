use std::{collections::HashMap, fs, io::ErrorKind, path::Path, sync::Arc};

use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::{Result, SscError};

static GLOBAL_CODE_CACHE: OnceCell<Arc<CodeCache>> = OnceCell::new();

/// Per-character stroke, structure and code tables used by the shape part of
/// the sound-shape code. Read-only once built.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CodeCache {
    strokes: HashMap<char, u32>,
    structure: HashMap<char, char>,
    four_corner: HashMap<char, String>,
    ssc: HashMap<char, String>,
}

impl CodeCache {
    /// Parse the JSON tables at `path`. A missing file yields empty tables.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("code tables not found at {:?}, shape codes fall back to zeros", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SscError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let cache = Self::from_json(&content).map_err(|source| SscError::CodeTable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "loaded code tables {:?}: {} strokes, {} structures, {} four-corner, {} ssc",
            path,
            cache.strokes.len(),
            cache.structure.len(),
            cache.four_corner.len(),
            cache.ssc.len()
        );
        Ok(cache)
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Install `cache` as the process-wide tables. Only the first install
    /// wins; later calls return the tables already in place.
    pub fn install(cache: CodeCache) -> Arc<CodeCache> {
        GLOBAL_CODE_CACHE.get_or_init(|| Arc::new(cache)).clone()
    }

    /// The process-wide tables, empty unless [`CodeCache::install`] ran first.
    pub fn global() -> Arc<CodeCache> {
        GLOBAL_CODE_CACHE
            .get_or_init(|| Arc::new(CodeCache::default()))
            .clone()
    }

    pub fn strokes(&self, ch: char) -> Option<u32> {
        self.strokes.get(&ch).copied()
    }

    pub fn structure(&self, ch: char) -> Option<char> {
        self.structure.get(&ch).copied()
    }

    pub fn four_corner(&self, ch: char) -> Option<&str> {
        self.four_corner.get(&ch).map(String::as_str)
    }

    /// A precomputed full code for `ch`, overriding the derived one.
    pub fn precomputed(&self, ch: char) -> Option<&str> {
        self.ssc.get(&ch).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_tables() {
        let cache = CodeCache::from_json(r#"{"strokes": {"中": 4}, "four_corner": {"中": "50006"}}"#)
            .unwrap();
        assert_eq!(cache.strokes('中'), Some(4));
        assert_eq!(cache.four_corner('中'), Some("50006"));
        assert_eq!(cache.structure('中'), None);
        assert_eq!(cache.precomputed('中'), None);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CodeCache::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(cache.strokes('中'), None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            CodeCache::load(&path),
            Err(SscError::CodeTable { .. })
        ));
    }
}
