//! Sound-shape confusion matching for Chinese business vocabularies.
//!
//! A [`ConfusionMatcher`] answers "which known brand or product name did the
//! user most likely mean by this slot?" It does this with a tab-separated
//! confusion dictionary, a coarse bucket index over sound-shape codes, and a
//! fine per-character scorer. [`Trie`] finds known terms inside whole
//! sentences.

pub mod cache;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod matcher;
pub mod models;
pub mod ssc;
pub mod state;
pub mod text_utils;
pub mod trie;

pub use crate::{
    cache::CodeCache,
    config::AppConfig,
    dictionary::{BusinessVocab, ConfusionDictionary},
    error::{Result, SscError},
    index::SimilarityIndex,
    matcher::{ConfusionMatcher, MatcherConfig},
    models::{
        ConfusionEntry, ExactCode, MatchResult, NameAliasHit, ScanMatch, ScoredCandidate,
        SscBlock, SscStatus,
    },
    ssc::{EncodeMode, PinyinCoder, Similarity, SoundShapeCoder, SscCode, SscScorer},
    trie::Trie,
};
