use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use log::info;

use crate::{
    dictionary::{BusinessVocab, ConfusionDictionary},
    index::SimilarityIndex,
    ssc::{EncodeMode, SoundShapeCoder},
    trie::Trie,
};

/// Everything derived from one business vocabulary.
#[derive(Debug)]
pub struct DomainIndex {
    pub similarity: SimilarityIndex,
    pub aliases: Trie,
}

impl DomainIndex {
    pub fn build(vocab: &BusinessVocab, coder: &dyn SoundShapeCoder, mode: EncodeMode) -> Self {
        Self {
            similarity: SimilarityIndex::build(vocab, coder, mode),
            aliases: vocab.aliases().map(|(alias, _)| alias).collect(),
        }
    }
}

/// Per-business indices, built on first use and shared afterwards.
///
/// An index is only published once it is fully built, so readers never see
/// a half-filled bucket map.
#[derive(Debug, Default)]
pub struct IndexCache {
    entries: Mutex<HashMap<String, Arc<DomainIndex>>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build<F>(&self, business: &str, build: F) -> Arc<DomainIndex>
    where
        F: FnOnce() -> DomainIndex,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = entries.get(business) {
            return Arc::clone(index);
        }
        let index = Arc::new(build());
        info!("built ssc index for business [{business}]");
        entries.insert(business.to_string(), Arc::clone(&index));
        index
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loaded dictionary together with the indices derived from it.
#[derive(Debug, Default)]
pub struct DictionaryState {
    pub dictionary: ConfusionDictionary,
    pub indices: IndexCache,
}

impl DictionaryState {
    pub fn new(dictionary: ConfusionDictionary) -> Self {
        Self {
            dictionary,
            indices: IndexCache::new(),
        }
    }
}

/// Load state of a matcher. Replacing the dictionary publishes a fresh
/// `Ready` state; there is no in-place update.
#[derive(Debug, Clone, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Ready(Arc<DictionaryState>),
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{cache::CodeCache, ssc::PinyinCoder};

    #[test]
    fn builds_once_per_business() {
        let dictionary = ConfusionDictionary::parse_str(
            "交通限行\t交通先行\ttraffic\n",
            Path::new("vocab.txt"),
        )
        .unwrap();
        let vocab = dictionary.business("traffic").unwrap();
        let coder = PinyinCoder::new(Arc::new(CodeCache::default()));
        let cache = IndexCache::new();

        let mut builds = 0;
        let first = cache.get_or_build("traffic", || {
            builds += 1;
            DomainIndex::build(vocab, &coder, EncodeMode::Sound)
        });
        let second = cache.get_or_build("traffic", || {
            builds += 1;
            DomainIndex::build(vocab, &coder, EncodeMode::Sound)
        });

        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.aliases.contains("交通先行"));
        assert_eq!(cache.len(), 1);
    }
}
