use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    dictionary::BusinessVocab,
    error::{Result, SscError},
    models::{ScoredCandidate, SscBlock},
    ssc::{EncodeMode, SoundShapeCoder, SscScorer},
};

/// Coarse key of `word`: the first two symbols of every character code.
///
/// Words of different length never share a key. Collisions between
/// equal-length words are expected; they only select candidates for fine
/// scoring.
pub fn bucket_key(word: &str, coder: &dyn SoundShapeCoder, mode: EncodeMode) -> Result<String> {
    let key: String = coder
        .encode(word, mode)
        .iter()
        .map(|code| code.head())
        .collect();
    if key.is_empty() {
        return Err(SscError::Encoding(word.to_string()));
    }
    Ok(key)
}

/// Score every candidate against `target` and keep those reaching the
/// threshold, best first. Ties keep candidate order.
pub fn refine(candidates: &[String], target: &str, scorer: &SscScorer) -> Vec<ScoredCandidate> {
    let mut ranked: Vec<ScoredCandidate> = candidates
        .iter()
        .filter_map(|candidate| {
            let similarity = scorer.compute_similarity(target, candidate);
            similarity.matched.then(|| ScoredCandidate {
                word: candidate.clone(),
                score: similarity.score,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Bucketed aliases and canonical names of one business.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    alias_buckets: HashMap<String, Vec<String>>,
    name_buckets: HashMap<String, Vec<String>>,
}

impl SimilarityIndex {
    /// Bucket every alias and canonical name of `vocab`. Words the coder
    /// cannot encode are left out of the index.
    pub fn build(vocab: &BusinessVocab, coder: &dyn SoundShapeCoder, mode: EncodeMode) -> Self {
        let alias_buckets = bucketize(vocab.aliases().map(|(alias, _)| alias), coder, mode);
        let name_buckets = bucketize(vocab.names().map(|(name, _)| name), coder, mode);
        debug!(
            "Gen ssc hash size: alias_ssc[{}]; name_ssc[{}]; raw alias size: {}; raw names size: {}",
            alias_buckets.len(),
            name_buckets.len(),
            vocab.alias_len(),
            vocab.name_len()
        );
        Self {
            alias_buckets,
            name_buckets,
        }
    }

    pub fn aliases_in(&self, key: &str) -> Option<&[String]> {
        self.alias_buckets.get(key).map(Vec::as_slice)
    }

    pub fn names_in(&self, key: &str) -> Option<&[String]> {
        self.name_buckets.get(key).map(Vec::as_slice)
    }

    /// Approximate matches of `target`, whose bucket key is `key`.
    ///
    /// Aliases are evaluated first and both sides are reported separately,
    /// even when the same word appears in each.
    pub fn lookup(&self, key: &str, target: &str, scorer: &SscScorer) -> SscBlock {
        let aliases = self.aliases_in(key);
        let names = self.names_in(key);
        if aliases.is_none() && names.is_none() {
            return SscBlock::default();
        }

        let alias_ssc = aliases
            .map(|candidates| refine(candidates, target, scorer))
            .unwrap_or_default();
        let name_ssc = names
            .map(|candidates| refine(candidates, target, scorer))
            .unwrap_or_default();
        SscBlock::new(alias_ssc, name_ssc)
    }
}

fn bucketize<'a>(
    words: impl Iterator<Item = &'a str>,
    coder: &dyn SoundShapeCoder,
    mode: EncodeMode,
) -> HashMap<String, Vec<String>> {
    let mut buckets: HashMap<String, Vec<String>> = HashMap::new();
    for word in words {
        match bucket_key(word, coder, mode) {
            Ok(key) => buckets.entry(key).or_default().push(word.to_string()),
            Err(err) => warn!("skipping dictionary word: {err}"),
        }
    }
    buckets
}
