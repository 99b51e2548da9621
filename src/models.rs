use serde::{ser::SerializeMap, Serialize, Serializer};

/// One dictionary line: `name<TAB>alias<TAB>business`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfusionEntry {
    pub name: String,
    pub alias: String,
    pub business: String,
}

/// How the slot was found verbatim in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactCode {
    /// The slot is a known alias.
    Alias,
    /// The slot is a known canonical name.
    Name,
}

impl ExactCode {
    pub fn code(self) -> u16 {
        match self {
            Self::Alias => 100,
            Self::Name => 200,
        }
    }
}

impl Serialize for ExactCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameAliasHit {
    pub name: String,
    pub code: ExactCode,
    pub cnt: u32,
}

/// Outcome of the approximate path.
///
/// Serialises to the historical mixed form: `-1` as a number, the others as
/// the strings `"301"`, `"302"` and `"303"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SscStatus {
    /// No bucket collision, or no candidate reached the threshold.
    #[default]
    NoMatch,
    AliasOnly,
    NameOnly,
    Both,
}

impl SscStatus {
    pub fn from_counts(aliases: usize, names: usize) -> Self {
        match (aliases > 0, names > 0) {
            (true, true) => Self::Both,
            (true, false) => Self::AliasOnly,
            (false, true) => Self::NameOnly,
            (false, false) => Self::NoMatch,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::NoMatch => -1,
            Self::AliasOnly => 301,
            Self::NameOnly => 302,
            Self::Both => 303,
        }
    }
}

impl Serialize for SscStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::NoMatch => serializer.serialize_i32(-1),
            other => serializer.serialize_str(&other.code().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub word: String,
    pub score: f64,
}

/// Ranked approximate matches. Aliases and names are kept apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SscBlock {
    pub code: SscStatus,
    #[serde(serialize_with = "serialize_ranked")]
    pub alias_ssc: Vec<ScoredCandidate>,
    #[serde(serialize_with = "serialize_ranked")]
    pub name_ssc: Vec<ScoredCandidate>,
}

impl SscBlock {
    pub fn new(alias_ssc: Vec<ScoredCandidate>, name_ssc: Vec<ScoredCandidate>) -> Self {
        Self {
            code: SscStatus::from_counts(alias_ssc.len(), name_ssc.len()),
            alias_ssc,
            name_ssc,
        }
    }
}

fn serialize_ranked<S: Serializer>(
    candidates: &[ScoredCandidate],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(candidates.len()))?;
    for candidate in candidates {
        map.serialize_entry(&candidate.word, &candidate.score)?;
    }
    map.end()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(rename = "name-alias", skip_serializing_if = "Option::is_none")]
    pub name_alias: Option<NameAliasHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssc: Option<SscBlock>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.name_alias.is_none() && self.ssc.is_none()
    }
}

/// A span found by [`crate::trie::Trie::scan`]. Offsets count characters and
/// `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub tag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_legacy_mixed_json() {
        assert_eq!(serde_json::to_string(&SscStatus::NoMatch).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&SscStatus::Both).unwrap(), "\"303\"");
    }

    #[test]
    fn status_from_counts() {
        assert_eq!(SscStatus::from_counts(0, 0), SscStatus::NoMatch);
        assert_eq!(SscStatus::from_counts(2, 0), SscStatus::AliasOnly);
        assert_eq!(SscStatus::from_counts(0, 1), SscStatus::NameOnly);
        assert_eq!(SscStatus::from_counts(1, 1), SscStatus::Both);
    }

    #[test]
    fn match_result_json_shape() {
        let result = MatchResult {
            name_alias: Some(NameAliasHit {
                name: "交通限行".into(),
                code: ExactCode::Alias,
                cnt: 1,
            }),
            ssc: Some(SscBlock::new(
                vec![ScoredCandidate {
                    word: "交通先行".into(),
                    score: 1.0,
                }],
                Vec::new(),
            )),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name-alias"]["code"], 100);
        assert_eq!(json["name-alias"]["name"], "交通限行");
        assert_eq!(json["ssc"]["code"], "301");
        assert_eq!(json["ssc"]["alias_ssc"]["交通先行"], 1.0);
        assert!(json["ssc"]["name_ssc"].as_object().unwrap().is_empty());
    }

    #[test]
    fn empty_result_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&MatchResult::default()).unwrap(), "{}");
    }
}
