#![allow(dead_code)]

use std::{collections::HashMap, fs, path::PathBuf, sync::Arc};

use ssc_match::{EncodeMode, SoundShapeCoder, SscCode};

/// Coder with hand-written codes; score is the share of equal symbols.
pub struct FakeCoder {
    codes: HashMap<char, &'static str>,
}

impl FakeCoder {
    pub fn new(codes: &[(char, &'static str)]) -> Arc<Self> {
        Arc::new(Self {
            codes: codes.iter().copied().collect(),
        })
    }
}

impl SoundShapeCoder for FakeCoder {
    fn encode(&self, text: &str, _mode: EncodeMode) -> Vec<SscCode> {
        text.chars()
            .filter_map(|ch| self.codes.get(&ch).map(|code| SscCode::new(*code)))
            .collect()
    }

    fn score(&self, a: &SscCode, b: &SscCode, _mode: EncodeMode) -> f64 {
        let len = a.as_str().chars().count().max(1);
        let same = a
            .as_str()
            .chars()
            .zip(b.as_str().chars())
            .filter(|(x, y)| x == y)
            .count();
        same as f64 / len as f64
    }
}

pub fn write_dictionary(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}
