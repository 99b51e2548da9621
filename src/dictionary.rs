use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use log::{debug, warn};

use crate::{
    error::{Result, SscError},
    models::ConfusionEntry,
};

/// Aliases and canonical names of one business, always built together.
///
/// Both maps remember first-insertion order so buckets and enumerations are
/// deterministic for a given source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessVocab {
    aliases: Vec<(String, String)>,
    alias_slots: HashMap<String, usize>,
    names: Vec<(String, u32)>,
    name_slots: HashMap<String, usize>,
}

impl BusinessVocab {
    /// Apply one line. The first alias wins; repeated or empty aliases are
    /// ignored. The canonical name is counted on every line.
    fn add(&mut self, business: &str, name: &str, alias: &str) {
        if alias.is_empty() || self.alias_slots.contains_key(alias) {
            debug!("{business} has occurred the same alias-[{alias}] or empty in the dictionary");
        } else {
            self.alias_slots.insert(alias.to_string(), self.aliases.len());
            self.aliases.push((alias.to_string(), name.to_string()));
        }

        match self.name_slots.get(name) {
            Some(&slot) => self.names[slot].1 += 1,
            None => {
                self.name_slots.insert(name.to_string(), self.names.len());
                self.names.push((name.to_string(), 1));
            }
        }
    }

    pub fn canonical_name(&self, alias: &str) -> Option<&str> {
        self.alias_slots
            .get(alias)
            .map(|&slot| self.aliases[slot].1.as_str())
    }

    pub fn name_count(&self, name: &str) -> Option<u32> {
        self.name_slots.get(name).map(|&slot| self.names[slot].1)
    }

    /// `(alias, canonical name)` pairs in first-seen order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(alias, name)| (alias.as_str(), name.as_str()))
    }

    /// `(canonical name, count)` pairs in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = (&str, u32)> {
        self.names.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn alias_len(&self) -> usize {
        self.aliases.len()
    }

    pub fn name_len(&self) -> usize {
        self.names.len()
    }
}

/// Confusion vocabulary keyed by business domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfusionDictionary {
    businesses: HashMap<String, BusinessVocab>,
}

impl ConfusionDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tab-separated dictionary. A missing file is logged and yields an
    /// empty dictionary.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("file not found.{}", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(SscError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let dictionary = Self::from_reader(BufReader::new(file), path)?;
        debug!("Load {} Success.", path.display());
        Ok(dictionary)
    }

    /// Parse every line of `reader`; `origin` is only used in errors.
    /// Any malformed line aborts the whole load.
    pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Self> {
        let mut dictionary = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| SscError::Io {
                path: origin.to_path_buf(),
                source,
            })?;
            if let Some(entry) = parse_line(&line, idx + 1, origin)? {
                dictionary.insert(entry);
            }
        }
        Ok(dictionary)
    }

    pub fn parse_str(content: &str, origin: &Path) -> Result<Self> {
        Self::from_reader(content.as_bytes(), origin)
    }

    pub fn insert(&mut self, entry: ConfusionEntry) {
        self.businesses
            .entry(entry.business.clone())
            .or_default()
            .add(&entry.business, &entry.name, &entry.alias);
    }

    pub fn business(&self, business: &str) -> Option<&BusinessVocab> {
        self.businesses.get(business)
    }

    pub fn businesses(&self) -> impl Iterator<Item = (&str, &BusinessVocab)> {
        self.businesses
            .iter()
            .map(|(name, vocab)| (name.as_str(), vocab))
    }

    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }
}

fn parse_line(raw: &str, line_no: usize, origin: &Path) -> Result<Option<ConfusionEntry>> {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    let [name, alias, business] = fields.as_slice() else {
        return Err(SscError::Format {
            path: origin.to_path_buf(),
            line_no,
            line: line.to_string(),
        });
    };

    Ok(Some(ConfusionEntry {
        name: name.to_string(),
        alias: alias.to_string(),
        business: business.to_string(),
    }))
}
