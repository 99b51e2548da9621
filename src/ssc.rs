//! Sound-shape codes (SSC) for Hanzi and the fine-grained word scorer.
//!
//! Every encodable character gets one [`SscCode`]. The default layout produced
//! by [`PinyinCoder`] is eleven symbols wide:
//!
//! ```text
//! sound: final | initial | compensation | tone
//! shape: structure | four-corner (5) | stroke count
//! ```
//!
//! [`EncodeMode::Sound`] keeps the first four symbols only. The first two
//! symbols of each code form the coarse bucket key, so fuzzy-equal readings
//! (`z`/`zh`, `n`/`l`, `an`/`ang`, ...) deliberately share a symbol.

use std::{fmt, sync::Arc};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{cache::CodeCache, text_utils::hanzi_syllables};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

const SOUND_LEN: usize = 4;
const SHAPE_LEN: usize = 7;
const SOUND_WEIGHTS: [f64; SOUND_LEN] = [0.4, 0.4, 0.1, 0.1];
const SHAPE_WEIGHTS: [f64; SHAPE_LEN] = [0.25, 0.1, 0.1, 0.1, 0.1, 0.1, 0.25];

const INITIAL_CODES: &[(&str, char)] = &[
    ("b", '1'),
    ("p", '2'),
    ("m", '3'),
    ("f", '4'),
    ("d", '5'),
    ("t", '6'),
    ("n", '7'),
    ("l", '7'),
    ("g", '8'),
    ("k", '9'),
    ("h", 'A'),
    ("j", 'B'),
    ("q", 'C'),
    ("x", 'D'),
    ("zh", 'E'),
    ("ch", 'F'),
    ("sh", 'G'),
    ("r", 'H'),
    ("z", 'E'),
    ("c", 'F'),
    ("s", 'G'),
    ("y", 'I'),
    ("w", 'J'),
];

const FINAL_CODES: &[(&str, char)] = &[
    ("a", '1'),
    ("o", '2'),
    ("e", '3'),
    ("i", '4'),
    ("u", '5'),
    ("v", '6'),
    ("ai", '7'),
    ("ei", '7'),
    ("ui", '8'),
    ("ao", '9'),
    ("ou", 'A'),
    ("iu", 'B'),
    ("ie", 'C'),
    ("ve", 'D'),
    ("er", 'E'),
    ("an", 'F'),
    ("en", 'G'),
    ("in", 'H'),
    ("un", 'I'),
    ("vn", 'J'),
    ("ang", 'F'),
    ("eng", 'G'),
    ("ing", 'H'),
    ("ong", 'K'),
];

/// Which parts of the code take part in bucketing and scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeMode {
    #[default]
    #[serde(alias = "SOUND")]
    Sound,
    #[serde(alias = "ALL", alias = "SOUND_SHAPE")]
    SoundShape,
}

impl fmt::Display for EncodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sound => f.write_str("sound"),
            Self::SoundShape => f.write_str("sound_shape"),
        }
    }
}

/// The code of a single character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SscCode(String);

impl SscCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first two symbols, used as this character's share of a bucket key.
    pub fn head(&self) -> &str {
        match self.0.char_indices().nth(2) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for SscCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoding and per-character scoring, injected wherever codes are needed so
/// tests can substitute deterministic codes.
pub trait SoundShapeCoder: Send + Sync {
    /// One code per encodable character of `text`, in order.
    fn encode(&self, text: &str, mode: EncodeMode) -> Vec<SscCode>;

    /// Similarity of two character codes in `[0, 1]`.
    fn score(&self, a: &SscCode, b: &SscCode, mode: EncodeMode) -> f64;
}

/// Default coder: sound part from the `pinyin` readings, shape part from the
/// [`CodeCache`] tables.
#[derive(Debug, Clone)]
pub struct PinyinCoder {
    cache: Arc<CodeCache>,
}

impl Default for PinyinCoder {
    fn default() -> Self {
        Self::new(CodeCache::global())
    }
}

impl PinyinCoder {
    pub fn new(cache: Arc<CodeCache>) -> Self {
        Self { cache }
    }

    fn shape_code(&self, ch: char) -> String {
        let mut shape = String::with_capacity(SHAPE_LEN);
        shape.push(self.cache.structure(ch).unwrap_or('0'));

        let corners: Vec<char> = self
            .cache
            .four_corner(ch)
            .map(|code| code.chars().take(5).collect())
            .unwrap_or_default();
        for idx in 0..5 {
            shape.push(corners.get(idx).copied().unwrap_or('0'));
        }

        let strokes = self.cache.strokes(ch).unwrap_or(0).min(35);
        shape.push(
            char::from_digit(strokes, 36)
                .map(|digit| digit.to_ascii_uppercase())
                .unwrap_or('0'),
        );
        shape
    }
}

impl SoundShapeCoder for PinyinCoder {
    fn encode(&self, text: &str, mode: EncodeMode) -> Vec<SscCode> {
        hanzi_syllables(text)
            .into_iter()
            .map(|(ch, syllable)| {
                let mut code = match self.cache.precomputed(ch) {
                    Some(full) if full.chars().count() == SOUND_LEN + SHAPE_LEN => full.to_string(),
                    _ => {
                        let (final_code, compensation) = final_code(&syllable.final_);
                        let mut code = String::with_capacity(SOUND_LEN + SHAPE_LEN);
                        code.push(final_code);
                        code.push(initial_code(&syllable.initial));
                        code.push(compensation);
                        code.push(char::from_digit(u32::from(syllable.tone), 10).unwrap_or('0'));
                        code.push_str(&self.shape_code(ch));
                        code
                    }
                };
                if mode == EncodeMode::Sound {
                    code.truncate(SOUND_LEN);
                }
                SscCode(code)
            })
            .collect()
    }

    fn score(&self, a: &SscCode, b: &SscCode, mode: EncodeMode) -> f64 {
        let a: Vec<char> = a.as_str().chars().collect();
        let b: Vec<char> = b.as_str().chars().collect();
        let sound = sound_similarity(&a, &b);
        match mode {
            EncodeMode::Sound => sound,
            EncodeMode::SoundShape => {
                let shape_a = a.get(SOUND_LEN..).unwrap_or_default();
                let shape_b = b.get(SOUND_LEN..).unwrap_or_default();
                0.5 * sound + 0.5 * shape_similarity(shape_a, shape_b)
            }
        }
    }
}

fn initial_code(initial: &str) -> char {
    INITIAL_CODES
        .iter()
        .find(|(spelling, _)| *spelling == initial)
        .map(|(_, code)| *code)
        .unwrap_or('0')
}

fn lookup_final(final_: &str) -> Option<char> {
    FINAL_CODES
        .iter()
        .find(|(spelling, _)| *spelling == final_)
        .map(|(_, code)| *code)
}

/// Code of a final plus the compensation code of its medial, if the medial
/// had to be split off (`iao` -> `ao` + `i`).
fn final_code(final_: &str) -> (char, char) {
    if let Some(code) = lookup_final(final_) {
        return (code, '0');
    }
    let mut chars = final_.chars();
    if let Some(medial) = chars.next().filter(|ch| matches!(ch, 'i' | 'u' | 'v')) {
        if let (Some(rest), Some(compensation)) =
            (lookup_final(chars.as_str()), lookup_final(&medial.to_string()))
        {
            return (rest, compensation);
        }
    }
    ('0', '0')
}

fn weighted_matches(a: &[char], b: &[char], weights: &[f64]) -> f64 {
    weights
        .iter()
        .enumerate()
        .filter(|(idx, _)| matches!((a.get(*idx), b.get(*idx)), (Some(x), Some(y)) if x == y))
        .map(|(_, weight)| weight)
        .sum()
}

fn sound_similarity(a: &[char], b: &[char]) -> f64 {
    weighted_matches(a, b, &SOUND_WEIGHTS)
}

fn shape_similarity(a: &[char], b: &[char]) -> f64 {
    let last = SHAPE_LEN - 1;
    let mut similarity = weighted_matches(a, b, &SHAPE_WEIGHTS[..last]);
    let strokes_a = a.get(last).and_then(|ch| ch.to_digit(36)).unwrap_or(0);
    let strokes_b = b.get(last).and_then(|ch| ch.to_digit(36)).unwrap_or(0);
    let max = strokes_a.max(strokes_b);
    let ratio = if max == 0 {
        1.0
    } else {
        1.0 - f64::from(strokes_a.abs_diff(strokes_b)) / f64::from(max)
    };
    similarity += SHAPE_WEIGHTS[last] * ratio;
    similarity
}

/// Outcome of comparing two words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub score: f64,
    pub matched: bool,
}

/// Fine-grained word scorer bound to one coder, mode and threshold.
#[derive(Clone)]
pub struct SscScorer {
    coder: Arc<dyn SoundShapeCoder>,
    mode: EncodeMode,
    threshold: f64,
}

impl fmt::Debug for SscScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SscScorer")
            .field("mode", &self.mode)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl SscScorer {
    pub fn new(coder: Arc<dyn SoundShapeCoder>, mode: EncodeMode, threshold: f64) -> Self {
        Self {
            coder,
            mode,
            threshold,
        }
    }

    pub fn coder(&self) -> &dyn SoundShapeCoder {
        self.coder.as_ref()
    }

    pub fn mode(&self) -> EncodeMode {
        self.mode
    }

    /// Compare `target` with `other` position by position.
    ///
    /// Words of different character length never match. The summed score is
    /// normalised by the character count of `target`, not of both words.
    pub fn compute_similarity(&self, target: &str, other: &str) -> Similarity {
        let target_len = target.chars().count();
        if target_len != other.chars().count() {
            debug!("{target} and {other} size is not equal");
            return Similarity {
                score: 0.0,
                matched: false,
            };
        }
        if target_len == 0 {
            return Similarity {
                score: 0.0,
                matched: false,
            };
        }

        let target_codes = self.coder.encode(target, self.mode);
        let other_codes = self.coder.encode(other, self.mode);
        let total: f64 = target_codes
            .iter()
            .zip(other_codes.iter())
            .map(|(a, b)| self.coder.score(a, b, self.mode))
            .sum();

        let score = total / target_len as f64;
        Similarity {
            score,
            matched: score >= self.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coder() -> PinyinCoder {
        PinyinCoder::new(Arc::new(CodeCache::default()))
    }

    #[test]
    fn head_takes_two_symbols() {
        assert_eq!(SscCode::new("F7D4").head(), "F7");
        assert_eq!(SscCode::new("F").head(), "F");
    }

    #[test]
    fn final_with_medial_gets_compensation() {
        assert_eq!(final_code("ang"), ('F', '0'));
        assert_eq!(final_code("iao"), ('9', '4'));
        assert_eq!(final_code("uang"), ('F', '5'));
        assert_eq!(final_code("van"), ('F', '6'));
        assert_eq!(final_code("ng"), ('0', '0'));
    }

    #[test]
    fn sound_mode_codes_are_four_symbols() {
        let codes = coder().encode("交通", EncodeMode::Sound);
        assert_eq!(codes.len(), 2);
        assert!(codes.iter().all(|code| code.as_str().chars().count() == 4));

        let codes = coder().encode("交通", EncodeMode::SoundShape);
        assert!(codes.iter().all(|code| code.as_str().chars().count() == 11));
    }

    fn populated_coder() -> PinyinCoder {
        let cache = CodeCache::from_json(
            r#"{
                "structure": {"先": "1", "限": "2"},
                "four_corner": {"先": "24210", "限": "77232"},
                "strokes": {"先": 6, "限": 8, "通": 12},
                "ssc": {"交": "ZZ010000001", "行": "short"}
            }"#,
        )
        .unwrap();
        PinyinCoder::new(Arc::new(cache))
    }

    fn codes(coder: &PinyinCoder, text: &str, mode: EncodeMode) -> Vec<String> {
        coder
            .encode(text, mode)
            .iter()
            .map(|code| code.as_str().to_string())
            .collect()
    }

    #[test]
    fn shape_part_comes_from_code_tables() {
        let coder = populated_coder();
        assert_eq!(
            codes(&coder, "先限", EncodeMode::SoundShape),
            vec!["FD411242106", "FD442772328"]
        );
        assert_eq!(codes(&coder, "先限", EncodeMode::Sound), vec!["FD41", "FD44"]);
        assert!(codes(&coder, "通", EncodeMode::SoundShape)[0].ends_with("000000C"));
    }

    #[test]
    fn precomputed_code_wins_when_complete() {
        let coder = populated_coder();
        assert_eq!(codes(&coder, "交", EncodeMode::SoundShape), vec!["ZZ010000001"]);
        assert_eq!(codes(&coder, "交", EncodeMode::Sound), vec!["ZZ01"]);

        let derived = codes(&coder, "行", EncodeMode::SoundShape);
        assert_ne!(derived[0], "short");
        assert_eq!(derived[0].chars().count(), 11);
    }

    #[test]
    fn sound_shape_score_mixes_both_parts() {
        let coder = populated_coder();
        let xian1 = SscCode::new("FD411242106");
        let xian4 = SscCode::new("FD442772328");
        let sound = 0.9;
        let shape = 0.1 + 0.25 * 0.75;
        let expected = 0.5 * sound + 0.5 * shape;
        assert!((coder.score(&xian1, &xian4, EncodeMode::SoundShape) - expected).abs() < 1e-9);
        assert!((coder.score(&xian1, &xian4, EncodeMode::Sound) - sound).abs() < 1e-9);

        let scorer = SscScorer::new(Arc::new(coder), EncodeMode::SoundShape, 0.8);
        let similarity = scorer.compute_similarity("交通先行", "交通限行");
        assert!((similarity.score - 0.8984375).abs() < 1e-9);
        assert!(similarity.matched);
    }

    #[test]
    fn empty_tables_make_every_shape_equal() {
        let coder = coder();
        let codes = coder.encode("先限", EncodeMode::SoundShape);
        let score = coder.score(&codes[0], &codes[1], EncodeMode::SoundShape);
        assert!((score - (0.5 * 0.9 + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn fuzzy_initials_share_a_code() {
        assert_eq!(initial_code("zh"), initial_code("z"));
        assert_eq!(initial_code("n"), initial_code("l"));
        assert_eq!(initial_code(""), '0');
    }

    #[test]
    fn tone_only_difference_scores_point_nine() {
        let coder = coder();
        let a = SscCode::new("F7D1");
        let b = SscCode::new("F7D4");
        assert!((coder.score(&a, &b, EncodeMode::Sound) - 0.9).abs() < 1e-9);
        assert!((coder.score(&a, &a, EncodeMode::Sound) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stroke_difference_is_proportional() {
        let a: Vec<char> = "0000004".chars().collect();
        let b: Vec<char> = "0000008".chars().collect();
        let expected = 0.75 + 0.25 * 0.5;
        assert!((shape_similarity(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn unequal_lengths_never_match() {
        let scorer = SscScorer::new(Arc::new(coder()), EncodeMode::Sound, 0.0);
        let similarity = scorer.compute_similarity("交通", "交通限行");
        assert_eq!(similarity.score, 0.0);
        assert!(!similarity.matched);
    }

    #[test]
    fn homophone_with_other_tone_matches() {
        let scorer = SscScorer::new(Arc::new(coder()), EncodeMode::Sound, 0.8);
        let similarity = scorer.compute_similarity("交通先行", "交通限行");
        assert!(similarity.matched, "score was {}", similarity.score);
        assert!(similarity.score < 1.0);
    }
}
