//! Load category dictionaries of words and multi-word phrases.
//!
//! A dictionary directory holds one `*.txt` file per category; the file stem
//! (lower-cased) names the category and every non-blank line is an entry.
//! Entries containing whitespace, `_` or `-` are phrases and go into the
//! [`PhraseIndex`]; everything else is a single token and goes into the
//! [`SingleTokenIndex`]. The same entry may appear in several files, in which
//! case it maps to all of their categories.
//!
//! Loading never fails: a missing directory or an unreadable file is logged
//! and skipped so that labeling can still run with whatever was loaded.
//!
//! # Example
//! ```no_run
//! use reqlabel_dict::Dictionary;
//!
//! let dict = Dictionary::load("NewDict");
//! if let Some(categories) = dict.singles().categories("Quick") {
//!     println!("quick -> {:?}", categories);
//! }
//! for m in dict.phrases().find_phrases("Make it user-friendly") {
//!     println!("{} {}..{} {}", m.category, m.start, m.end, m.text);
//! }
//! ```
//!
//! For a runnable demo, see `cargo run -p reqlabel-dict --example stats -- <dict-dir>`.

mod phrase;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

pub use phrase::{PhraseIndex, PhraseMatch};

/// Categories attached to one normalized entry, in name order.
pub type Categories = BTreeSet<String>;

/// How a raw dictionary line is indexed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    Token,
    Phrase,
}

/// Classify a raw entry as a single token or a multi-word phrase.
pub fn classify_entry(raw: &str) -> EntryKind {
    if raw
        .trim()
        .chars()
        .any(|c| c.is_whitespace() || c == '_' || c == '-')
    {
        EntryKind::Phrase
    } else {
        EntryKind::Token
    }
}

/// Case-fold and trim a single token.
pub fn normalize_token(raw: &str) -> String {
    raw.trim().chars().flat_map(char::to_lowercase).collect()
}

/// Normalize a phrase: `_`/`-` become spaces, whitespace runs collapse to a
/// single space, and the result is case-folded.
pub fn normalize_phrase(raw: &str) -> String {
    phrase::fold(raw)
}

/// Normalized single token → categories.
#[derive(Clone, Debug, Default)]
pub struct SingleTokenIndex {
    entries: HashMap<String, Categories>,
}

impl SingleTokenIndex {
    /// Insert a raw token under `category`. Returns `false` when the pair was
    /// already present or the token is empty after normalization.
    pub fn insert(&mut self, raw: &str, category: &str) -> bool {
        let key = normalize_token(raw);
        if key.is_empty() {
            return false;
        }
        self.entries
            .entry(key)
            .or_default()
            .insert(category.to_string())
    }

    /// Categories for a token; the lookup key is normalized first.
    pub fn categories(&self, token: &str) -> Option<&Categories> {
        self.entries.get(&normalize_token(token))
    }

    /// Lookup by an already normalized key.
    pub fn get(&self, normalized: &str) -> Option<&Categories> {
        self.entries.get(normalized)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.categories(token).is_some()
    }

    /// Iterate over normalized tokens.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entry counts contributed by one category.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CategoryStats {
    pub words: usize,
    pub phrases: usize,
}

/// Both indices plus per-category bookkeeping. Immutable once loaded.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    singles: SingleTokenIndex,
    phrases: PhraseIndex,
    categories: BTreeMap<String, CategoryStats>,
}

impl Dictionary {
    /// Load every `*.txt` file of `dir`, in path order.
    ///
    /// A missing directory, an empty directory, or an unreadable file is
    /// reported with `warn!` and otherwise ignored.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut dict = Dictionary::default();
        info!("loading dictionaries from {}", dir.display());

        if !dir.is_dir() {
            warn!(
                "dictionary directory {} does not exist or is not a directory",
                dir.display()
            );
            return dict;
        }

        let files = match dictionary_files(dir) {
            Ok(files) => files,
            Err(err) => {
                warn!("cannot list dictionary directory: {err:#}");
                return dict;
            }
        };
        if files.is_empty() {
            warn!("no .txt dictionary files found in {}", dir.display());
            return dict;
        }

        for path in files {
            let Some(category) = category_name(&path) else {
                warn!("skipping {}: file name is not valid UTF-8", path.display());
                continue;
            };
            let contents = match read_entries(&path) {
                Ok(contents) => contents,
                Err(err) => {
                    warn!("skipping {}: {err:#}", path.display());
                    continue;
                }
            };
            let lines = contents.lines().count();
            let added = dict.add_entries(&category, contents.lines());
            debug!(
                "category '{category}': read {lines} lines, {} phrases and {} single words",
                added.phrases, added.words
            );
        }

        info!(
            "loaded {} single words and {} multi-word phrases across {} categories",
            dict.singles.len(),
            dict.phrases.len(),
            dict.categories.len()
        );
        dict
    }

    /// Add one raw entry under `category`, classifying it on the way.
    pub fn add_entry(&mut self, category: &str, raw: &str) -> Option<EntryKind> {
        let entry = raw.trim();
        if entry.is_empty() {
            return None;
        }
        let kind = classify_entry(entry);
        let inserted = match kind {
            EntryKind::Phrase => self.phrases.insert(entry, category),
            EntryKind::Token => self.singles.insert(entry, category),
        };
        if !inserted {
            return None;
        }
        let stats = self.categories.entry(category.to_string()).or_default();
        match kind {
            EntryKind::Phrase => stats.phrases += 1,
            EntryKind::Token => stats.words += 1,
        }
        Some(kind)
    }

    /// Add many raw entries under `category`; returns what was added.
    pub fn add_entries<'a, I>(&mut self, category: &str, lines: I) -> CategoryStats
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = CategoryStats::default();
        for line in lines {
            match self.add_entry(category, line) {
                Some(EntryKind::Phrase) => added.phrases += 1,
                Some(EntryKind::Token) => added.words += 1,
                None => {}
            }
        }
        added
    }

    pub fn singles(&self) -> &SingleTokenIndex {
        &self.singles
    }

    pub fn phrases(&self) -> &PhraseIndex {
        &self.phrases
    }

    /// Categories seen while loading, with their entry counts.
    pub fn categories(&self) -> &BTreeMap<String, CategoryStats> {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.phrases.is_empty()
    }
}

fn dictionary_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("read entry of {}", dir.display()))?
            .path();
        let is_txt = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_txt && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn category_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_lowercase)
}

fn read_entries(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_entries_by_separator() {
        assert_eq!(classify_entry("quick"), EntryKind::Token);
        assert_eq!(classify_entry("  quick  "), EntryKind::Token);
        assert_eq!(classify_entry("user friendly"), EntryKind::Phrase);
        assert_eq!(classify_entry("user_friendly"), EntryKind::Phrase);
        assert_eq!(classify_entry("all-out"), EntryKind::Phrase);
        assert_eq!(classify_entry("as\tneeded"), EntryKind::Phrase);
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["  Quick ", "ÉLAN", "user__Friendly", "All - Out", " as   NEEDED "] {
            let token = normalize_token(raw);
            assert_eq!(normalize_token(&token), token);
            let phrase = normalize_phrase(raw);
            assert_eq!(normalize_phrase(&phrase), phrase);
        }
        assert_eq!(normalize_phrase("User_Friendly"), "user friendly");
        assert_eq!(normalize_phrase("  all - out  "), "all out");
        assert_eq!(normalize_token("  Quick "), "quick");
    }

    #[test]
    fn aggregates_categories_across_files() {
        let mut dict = Dictionary::default();
        dict.add_entries("vague", ["fast", "user friendly"]);
        dict.add_entries("adj", ["Fast", "User-Friendly"]);

        let cats = dict.singles().categories("FAST").expect("fast indexed");
        assert_eq!(
            cats.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["adj", "vague"]
        );
        let phrase_cats = dict
            .phrases()
            .categories("user friendly")
            .expect("phrase indexed");
        assert_eq!(phrase_cats.len(), 2);
        assert_eq!(dict.singles().len(), 1);
        assert_eq!(dict.phrases().len(), 1);
    }

    #[test]
    fn skips_blank_and_duplicate_lines() {
        let mut dict = Dictionary::default();
        let added = dict.add_entries("adj", ["quick", "", "   ", "quick", "slow"]);
        assert_eq!(added, CategoryStats { words: 2, phrases: 0 });
        assert_eq!(
            dict.categories().get("adj"),
            Some(&CategoryStats { words: 2, phrases: 0 })
        );
        assert!(!dict.is_empty());
    }
}
