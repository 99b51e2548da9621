use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use log::{debug, warn};

use crate::{
    config::AppConfig,
    dictionary::{BusinessVocab, ConfusionDictionary},
    error::{Result, SscError},
    index::bucket_key,
    models::{ExactCode, MatchResult, NameAliasHit, ScanMatch},
    ssc::{EncodeMode, Similarity, SoundShapeCoder, SscScorer, DEFAULT_SIMILARITY_THRESHOLD},
    state::{DictionaryState, DomainIndex, Lifecycle},
    trie::DEFAULT_SCAN_TAG,
};

/// Settings consumed by [`ConfusionMatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    pub dictionary_path: Option<PathBuf>,
    pub similarity_threshold: f64,
    pub encode_mode: EncodeMode,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            dictionary_path: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            encode_mode: EncodeMode::default(),
        }
    }
}

impl From<&AppConfig> for MatcherConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            dictionary_path: config.dictionary_path.clone(),
            similarity_threshold: config.similarity_threshold,
            encode_mode: config.encode_mode,
        }
    }
}

/// Looks up slots against a business vocabulary, first verbatim and then by
/// sound-shape similarity.
///
/// The dictionary is loaded on first use. Per-business indices are built on
/// the first query for that business and reused until the dictionary is
/// replaced.
pub struct ConfusionMatcher {
    scorer: SscScorer,
    dictionary_path: Mutex<Option<PathBuf>>,
    state: Mutex<Lifecycle>,
}

impl ConfusionMatcher {
    pub fn new(config: MatcherConfig, coder: Arc<dyn SoundShapeCoder>) -> Self {
        Self {
            scorer: SscScorer::new(coder, config.encode_mode, config.similarity_threshold),
            dictionary_path: Mutex::new(config.dictionary_path),
            state: Mutex::new(Lifecycle::Uninitialized),
        }
    }

    /// A matcher that is ready immediately, without touching the filesystem.
    pub fn with_dictionary(
        dictionary: ConfusionDictionary,
        config: MatcherConfig,
        coder: Arc<dyn SoundShapeCoder>,
    ) -> Self {
        let matcher = Self::new(config, coder);
        matcher.publish(dictionary);
        matcher
    }

    pub fn scorer(&self) -> &SscScorer {
        &self.scorer
    }

    pub fn is_ready(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            Lifecycle::Ready(_)
        )
    }

    /// Path of the dictionary in use, or the one a lazy load will read.
    pub fn dictionary_path(&self) -> Option<PathBuf> {
        self.dictionary_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the dictionary with the one at `path`. On error the current
    /// dictionary stays in place.
    pub fn set_dictionary_path(&self, path: &Path) -> Result<()> {
        let dictionary = ConfusionDictionary::load(path)?;
        *self
            .dictionary_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(path.to_path_buf());
        self.publish(dictionary);
        Ok(())
    }

    fn publish(&self, dictionary: ConfusionDictionary) {
        let ready = Lifecycle::Ready(Arc::new(DictionaryState::new(dictionary)));
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = ready;
    }

    fn ensure_ready(&self) -> Result<Arc<DictionaryState>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Lifecycle::Ready(ready) = &*state {
            return Ok(Arc::clone(ready));
        }

        let dictionary = match self.dictionary_path() {
            Some(path) => ConfusionDictionary::load(&path)?,
            None => {
                warn!("no confusion dictionary configured");
                ConfusionDictionary::new()
            }
        };
        let ready = Arc::new(DictionaryState::new(dictionary));
        *state = Lifecycle::Ready(Arc::clone(&ready));
        Ok(ready)
    }

    fn domain<'a>(
        &self,
        state: &'a DictionaryState,
        business: &str,
    ) -> Result<(&'a BusinessVocab, Arc<DomainIndex>)> {
        let vocab = state
            .dictionary
            .business(business)
            .filter(|vocab| vocab.alias_len() > 0)
            .ok_or_else(|| SscError::DomainNotFound(business.to_string()))?;
        let index = state.indices.get_or_build(business, || {
            DomainIndex::build(vocab, self.scorer.coder(), self.scorer.mode())
        });
        Ok((vocab, index))
    }

    /// Match `slot` against the vocabulary of `business`.
    ///
    /// Empty inputs give an empty result. An unknown business, or one without
    /// aliases, is an error, as is a slot that cannot be encoded.
    pub fn match_slot(&self, business: &str, slot: &str) -> Result<MatchResult> {
        let mut result = MatchResult::default();
        if business.is_empty() || slot.is_empty() {
            return Ok(result);
        }

        let state = self.ensure_ready()?;
        let (vocab, index) = self.domain(&state, business)?;

        result.name_alias = exact_hit(vocab, slot);

        let key = bucket_key(slot, self.scorer.coder(), self.scorer.mode())?;
        let block = index.similarity.lookup(&key, slot, &self.scorer);
        debug!(
            "slot [{slot}] in [{business}]: key {key}, status {}",
            block.code.code()
        );
        result.ssc = Some(block);
        Ok(result)
    }

    /// Find known aliases of `business` inside `text`.
    pub fn scan(&self, business: &str, text: &str) -> Result<Vec<ScanMatch>> {
        if business.is_empty() || text.is_empty() {
            return Ok(Vec::new());
        }
        let state = self.ensure_ready()?;
        let (_, index) = self.domain(&state, business)?;
        Ok(index.aliases.scan(text, 0, DEFAULT_SCAN_TAG))
    }

    pub fn compute_similarity(&self, target: &str, other: &str) -> Similarity {
        self.scorer.compute_similarity(target, other)
    }
}

/// A slot that is an alias points at its canonical name; a slot that is a
/// canonical name reports how often it was seen.
fn exact_hit(vocab: &BusinessVocab, slot: &str) -> Option<NameAliasHit> {
    if let Some(name) = vocab.canonical_name(slot) {
        return Some(NameAliasHit {
            name: name.to_string(),
            code: ExactCode::Alias,
            cnt: 1,
        });
    }
    vocab.name_count(slot).map(|cnt| NameAliasHit {
        name: slot.to_string(),
        code: ExactCode::Name,
        cnt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> BusinessVocab {
        ConfusionDictionary::parse_str(
            "交通限行\t交通先行\ttraffic\n交通限行\t交通显行\ttraffic\n",
            Path::new("vocab.txt"),
        )
        .unwrap()
        .business("traffic")
        .cloned()
        .unwrap()
    }

    #[test]
    fn alias_hit_points_at_canonical_name() {
        let hit = exact_hit(&vocab(), "交通先行").unwrap();
        assert_eq!(hit.name, "交通限行");
        assert_eq!(hit.code, ExactCode::Alias);
        assert_eq!(hit.cnt, 1);
    }

    #[test]
    fn name_hit_carries_count() {
        let hit = exact_hit(&vocab(), "交通限行").unwrap();
        assert_eq!(hit.name, "交通限行");
        assert_eq!(hit.code, ExactCode::Name);
        assert_eq!(hit.cnt, 2);
    }

    #[test]
    fn unknown_slot_has_no_hit() {
        assert!(exact_hit(&vocab(), "天气预报").is_none());
    }
}
