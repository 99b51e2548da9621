use std::collections::HashMap;

use crate::models::ScanMatch;

pub const DEFAULT_SCAN_TAG: &str = "confusion";

/// A trie node. Children are kept in creation order; `slots` indexes them by
/// character.
#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: Vec<(char, TrieNode)>,
    slots: HashMap<char, usize>,
    terminal: bool,
}

impl TrieNode {
    fn child(&self, ch: char) -> Option<&TrieNode> {
        self.slots.get(&ch).map(|&slot| &self.children[slot].1)
    }

    fn child_or_insert(&mut self, ch: char) -> &mut TrieNode {
        let slot = match self.slots.get(&ch) {
            Some(&slot) => slot,
            None => {
                let slot = self.children.len();
                self.children.push((ch, TrieNode::default()));
                self.slots.insert(ch, slot);
                slot
            }
        };
        &mut self.children[slot].1
    }
}

/// Prefix tree over characters, used to find known terms in free text with a
/// single left-to-right pass.
#[derive(Debug, Default, Clone)]
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `word`. Inserting the same word again changes nothing; the empty
    /// word is ignored.
    pub fn insert(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.child_or_insert(ch);
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    fn find(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.child(ch)?;
        }
        Some(node)
    }

    /// Whether `word` was inserted as a complete word.
    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some_and(|node| node.terminal)
    }

    /// Whether any inserted word starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.find(prefix).is_some()
    }

    /// Words starting with `prefix`, in child-creation order.
    ///
    /// When `prefix` is itself a word, only `prefix` is returned; longer words
    /// sharing it are not enumerated.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };
        if start.terminal {
            return vec![prefix.to_string()];
        }

        let mut words = Vec::new();
        let mut stack = vec![(prefix.to_string(), start)];
        while let Some((word, node)) = stack.pop() {
            if node.terminal {
                words.push(word.clone());
            }
            for (ch, child) in node.children.iter().rev() {
                let mut next = word.clone();
                next.push(*ch);
                stack.push((next, child));
            }
        }
        words
    }

    /// Scan `text` for inserted words.
    ///
    /// The earliest terminal node reached from the current window start wins;
    /// scanning then restarts right after it. A character with no transition
    /// is skipped and a new window starts at the next character, so spans
    /// never overlap. Offsets are character offsets shifted by
    /// `origin_offset`, end-exclusive.
    pub fn scan(&self, text: &str, origin_offset: usize, tag: &str) -> Vec<ScanMatch> {
        let chars: Vec<char> = text.chars().collect();
        let mut matches = Vec::new();
        let mut node = &self.root;
        let mut window_start = 0;
        let mut pos = 0;

        while pos < chars.len() {
            let Some(child) = node.child(chars[pos]) else {
                pos += 1;
                window_start = pos;
                node = &self.root;
                continue;
            };

            if child.terminal {
                matches.push(ScanMatch {
                    text: chars[window_start..=pos].iter().collect(),
                    start: origin_offset + window_start,
                    end: origin_offset + pos + 1,
                    tag: tag.to_string(),
                });
                pos += 1;
                window_start = pos;
                node = &self.root;
            } else {
                node = child;
                pos += 1;
            }
        }
        matches
    }

    /// Number of distinct words inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<S: AsRef<str>> Extend<S> for Trie {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for word in iter {
            self.insert(word.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for Trie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(matches: &[ScanMatch]) -> Vec<(&str, usize, usize)> {
        matches
            .iter()
            .map(|m| (m.text.as_str(), m.start, m.end))
            .collect()
    }

    #[test]
    fn insert_and_contains() {
        let mut trie = Trie::new();
        trie.insert("神威");
        trie.insert("神威");
        trie.insert("");

        assert_eq!(trie.len(), 1);
        assert!(trie.contains("神威"));
        assert!(!trie.contains("神"));
        assert!(trie.has_prefix("神"));
        assert!(trie.has_prefix(""));
        assert!(!trie.has_prefix("少"));
    }

    #[test]
    fn prefix_that_is_a_word_short_circuits() {
        let trie: Trie = ["交通", "交通限行", "交通管制"].into_iter().collect();
        assert_eq!(trie.words_with_prefix("交通"), vec!["交通"]);
    }

    #[test]
    fn prefix_enumeration_follows_insertion_order() {
        let trie: Trie = ["交通限行", "交通管制", "交友", "交通限速"].into_iter().collect();
        assert_eq!(
            trie.words_with_prefix("交"),
            vec!["交通限行", "交通限速", "交通管制", "交友"]
        );
        assert!(trie.words_with_prefix("少").is_empty());
    }

    #[test]
    fn scan_applies_origin_offset_and_tag() {
        let trie: Trie = ["神威", "少波"].into_iter().collect();
        let matches = trie.scan("今天神威天气", 10, "brand");
        assert_eq!(spans(&matches), vec![("神威", 12, 14)]);
        assert_eq!(matches[0].tag, "brand");
    }

    #[test]
    fn shortest_completed_match_wins() {
        let trie: Trie = ["交通", "交通限行"].into_iter().collect();
        let matches = trie.scan("交通限行", 0, DEFAULT_SCAN_TAG);
        assert_eq!(spans(&matches), vec![("交通", 0, 2)]);
    }

    #[test]
    fn failed_character_is_skipped_not_retried() {
        let trie: Trie = ["ab"].into_iter().collect();
        assert!(trie.scan("aab", 0, DEFAULT_SCAN_TAG).is_empty());
        assert_eq!(spans(&trie.scan("xaby", 0, DEFAULT_SCAN_TAG)), vec![("ab", 1, 3)]);
    }

    #[test]
    fn adjacent_matches_are_all_reported() {
        let trie: Trie = ["神威", "少波"].into_iter().collect();
        let matches = trie.scan("神威少波神威", 0, DEFAULT_SCAN_TAG);
        assert_eq!(
            spans(&matches),
            vec![("神威", 0, 2), ("少波", 2, 4), ("神威", 4, 6)]
        );
    }

    #[test]
    fn spans_and_gaps_rebuild_the_text() {
        let trie: Trie = ["神威", "少波", "因该", "炒饭"].into_iter().collect();
        let text = "我因该去吃炒饭神少波x神威";
        let chars: Vec<char> = text.chars().collect();
        let matches = trie.scan(text, 0, DEFAULT_SCAN_TAG);

        let mut rebuilt = String::new();
        let mut cursor = 0;
        for m in &matches {
            assert!(m.start >= cursor, "overlapping span {m:?}");
            rebuilt.extend(&chars[cursor..m.start]);
            rebuilt.push_str(&m.text);
            cursor = m.end;
        }
        rebuilt.extend(&chars[cursor..]);
        assert_eq!(rebuilt, text);
        assert_eq!(matches.len(), 3);
    }
}
