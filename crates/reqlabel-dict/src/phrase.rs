use std::collections::HashMap;
use std::ops::Range;

use crate::Categories;

/// A phrase found in a requirement text.
///
/// `start..end` is a byte range into the text that was searched, so `text`
/// is the exact surface form (original casing, hyphens and spacing).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhraseMatch {
    pub category: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl PhraseMatch {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Clone, Debug)]
struct PhraseEntry {
    normalized: String,
    categories: Categories,
}

/// Normalized multi-word phrases, bucketed by their leading word.
#[derive(Clone, Debug, Default)]
pub struct PhraseIndex {
    entries: Vec<PhraseEntry>,
    by_phrase: HashMap<String, usize>,
    by_head: HashMap<String, Vec<usize>>,
}

impl PhraseIndex {
    /// Insert a raw phrase under `category`. Returns `false` when the pair
    /// was already present or nothing is left after normalization.
    pub fn insert(&mut self, raw: &str, category: &str) -> bool {
        let normalized = fold(raw);
        if normalized.is_empty() {
            return false;
        }
        if let Some(&idx) = self.by_phrase.get(&normalized) {
            return self.entries[idx].categories.insert(category.to_string());
        }

        let idx = self.entries.len();
        let head = head_word(&normalized).to_string();
        self.by_phrase.insert(normalized.clone(), idx);
        self.entries.push(PhraseEntry {
            normalized,
            categories: Categories::from([category.to_string()]),
        });

        // Longer phrases are tried first at a given position.
        let entries = &self.entries;
        let bucket = self.by_head.entry(head).or_default();
        bucket.push(idx);
        bucket.sort_by_key(|&i| std::cmp::Reverse(entries[i].normalized.len()));
        true
    }

    /// Categories of a phrase; the lookup key is normalized first.
    pub fn categories(&self, phrase: &str) -> Option<&Categories> {
        self.by_phrase
            .get(&fold(phrase))
            .map(|&idx| &self.entries[idx].categories)
    }

    /// Iterate over normalized phrases in insertion order.
    pub fn phrases(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.normalized.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find every occurrence of every indexed phrase in `text`.
    ///
    /// Matching is case-insensitive and ignores the difference between
    /// spaces, runs of whitespace, `_` and `-`. A match must begin and end on
    /// a word boundary. Overlapping matches are all reported, and a phrase
    /// listed under several categories yields one match per category.
    /// Results are ordered by start offset, longer phrases first.
    pub fn find_phrases(&self, text: &str) -> Vec<PhraseMatch> {
        let mut found = Vec::new();
        if self.entries.is_empty() {
            return found;
        }

        let folded = FoldedText::new(text);
        let hay = folded.text.as_str();
        let mut prev: Option<char> = None;
        for (pos, ch) in hay.char_indices() {
            let starts_word = prev.is_none_or(|p| !p.is_alphanumeric()) || !ch.is_alphanumeric();
            prev = Some(ch);
            if !starts_word {
                continue;
            }

            let rest = &hay[pos..];
            let Some(bucket) = self.by_head.get(head_word(rest)) else {
                continue;
            };
            for &idx in bucket {
                let entry = &self.entries[idx];
                if !rest.starts_with(entry.normalized.as_str()) {
                    continue;
                }
                let end = pos + entry.normalized.len();
                if !ends_word(&entry.normalized, &hay[end..]) {
                    continue;
                }
                let span = folded.source_span(pos, end);
                for category in &entry.categories {
                    found.push(PhraseMatch {
                        category: category.clone(),
                        start: span.start,
                        end: span.end,
                        text: text[span.clone()].to_string(),
                    });
                }
            }
        }
        found
    }
}

/// Text in phrase-normalized form, remembering where each byte came from.
struct FoldedText {
    text: String,
    origin: Vec<Range<usize>>,
}

impl FoldedText {
    fn new(source: &str) -> Self {
        let mut folded = FoldedText {
            text: String::with_capacity(source.len()),
            origin: Vec::with_capacity(source.len()),
        };
        let mut gap: Option<Range<usize>> = None;
        for (idx, ch) in source.char_indices() {
            let range = idx..idx + ch.len_utf8();
            if is_separator(ch) {
                gap = Some(match gap {
                    Some(open) => open.start..range.end,
                    None => range,
                });
                continue;
            }
            if let Some(open) = gap.take()
                && !folded.text.is_empty()
            {
                folded.push(' ', open);
            }
            for lower in ch.to_lowercase() {
                folded.push(lower, range.clone());
            }
        }
        folded
    }

    fn push(&mut self, ch: char, origin: Range<usize>) {
        self.text.push(ch);
        for _ in 0..ch.len_utf8() {
            self.origin.push(origin.clone());
        }
    }

    /// Map a non-empty folded byte range back to the source text.
    fn source_span(&self, start: usize, end: usize) -> Range<usize> {
        self.origin[start].start..self.origin[end - 1].end
    }
}

pub(crate) fn fold(raw: &str) -> String {
    FoldedText::new(raw).text
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '_' || ch == '-'
}

/// Leading alphanumeric run, or the first character when it is not alphanumeric.
fn head_word(s: &str) -> &str {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_alphanumeric())
        .map_or(s.len(), |(i, _)| i);
    if end > 0 {
        &s[..end]
    } else {
        s.chars().next().map_or(s, |c| &s[..c.len_utf8()])
    }
}

fn ends_word(phrase: &str, after: &str) -> bool {
    phrase.chars().next_back().is_none_or(|c| !c.is_alphanumeric())
        || after.chars().next().is_none_or(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &str)]) -> PhraseIndex {
        let mut idx = PhraseIndex::default();
        for (category, phrase) in entries {
            idx.insert(phrase, category);
        }
        idx
    }

    #[test]
    fn recovers_original_surface_form() {
        let idx = index(&[("vague", "user friendly")]);
        let found = idx.find_phrases("Make it User-Friendly");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, "vague");
        assert_eq!(found[0].text, "User-Friendly");
        assert_eq!(found[0].span(), 8..21);
    }

    #[test]
    fn spans_collapsed_whitespace() {
        let idx = index(&[("loophole", "as_appropriate")]);
        let text = "Log in as \t appropriate.";
        let found = idx.find_phrases(text);
        assert_eq!(found.len(), 1);
        assert_eq!(&text[found[0].span()], "as \t appropriate");
    }

    #[test]
    fn requires_word_boundaries() {
        let idx = index(&[("x", "\u{130}stanbul office")]);
        let text = "The \u{130}stanbul office";
        let found = idx.find_phrases(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "\u{130}stanbul office");
    }

    #[test]
    fn keeps_overlapping_matches() {
        let idx = index(&[
            ("vague", "as needed"),
            ("loophole", "needed by"),
            ("weak", "log in"),
            ("directive", "log in securely"),
        ]);
        let found = idx.find_phrases("Log in securely as needed by admins");
        let got: Vec<(&str, &str)> = found
            .iter()
            .map(|m| (m.category.as_str(), m.text.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("directive", "Log in securely"),
                ("weak", "Log in"),
                ("vague", "as needed"),
                ("loophole", "needed by"),
            ]
        );
    }

    #[test]
    fn words_inside_other_words_do_not_match() {
        let idx = index(&[("weak", "log in")]);
        assert!(idx.find_phrases("catalog insert").is_empty());
    }

    #[test]
    fn empty_index_finds_nothing() {
        assert!(PhraseIndex::default().find_phrases("anything").is_empty());
    }
}
