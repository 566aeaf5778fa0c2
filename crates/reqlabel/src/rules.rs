//! Grammatical rules per category and the category priority order.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use reqlabel_types::{Pos, Token};
use serde::Deserialize;
use thiserror::Error;

/// Which annotations a category accepts: a token matches when its coarse
/// POS is in `pos` or its fine tag is in `tags`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CategoryRule {
    pub pos: BTreeSet<Pos>,
    pub tags: BTreeSet<String>,
}

impl CategoryRule {
    pub fn accepts(&self, pos: Pos, tag: &str) -> bool {
        self.pos.contains(&pos) || self.tags.contains(tag)
    }

    pub fn accepts_token(&self, token: &Token) -> bool {
        self.accepts(token.pos, &token.tag)
    }
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("read rules file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse rules file {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("category `{category}`: unknown part-of-speech tag `{tag}`")]
    UnknownPos { category: String, tag: String },
    #[error("category `{0}` is listed twice in the priority order")]
    DuplicatePriority(String),
}

/// Category rules plus the priority order used to break ties.
#[derive(Clone, Debug)]
pub struct CategoryRules {
    rules: BTreeMap<String, CategoryRule>,
    priority: Vec<String>,
    rank: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct RulesFile {
    #[serde(default)]
    priority: Vec<String>,
    #[serde(default)]
    categories: BTreeMap<String, RuleEntry>,
}

#[derive(Deserialize)]
struct RuleEntry {
    #[serde(default)]
    pos: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

const BUILTIN: &[(&str, &[Pos], &[&str])] = &[
    ("vpastp", &[], &["VBN"]),
    ("vpresp", &[], &["VBG"]),
    ("superlative", &[], &["JJS", "RBS"]),
    ("comparative", &[], &["JJR", "RBR"]),
    (
        "negative",
        &[Pos::Part, Pos::Adv, Pos::Det, Pos::Pron, Pos::Cconj],
        &[],
    ),
    ("weak", &[Pos::Aux], &["MD"]),
    ("imperative", &[Pos::Aux, Pos::Verb], &["MD"]),
    ("directive", &[Pos::Noun, Pos::Propn, Pos::Adv, Pos::X], &[]),
    ("optional", &[Pos::Adv, Pos::Adj, Pos::Cconj], &[]),
    ("vague", &[Pos::Adj, Pos::Adv], &[]),
    ("subjective", &[Pos::Adj, Pos::Adv], &[]),
    ("loophole", &[Pos::Adv, Pos::Adp, Pos::Sconj], &[]),
    (
        "continuance",
        &[Pos::Adv, Pos::Adp, Pos::Sconj, Pos::Verb],
        &["IN", "RB", "VBG"],
    ),
    ("incomplete", &[Pos::Noun, Pos::Pron, Pos::Adv, Pos::X], &["FW"]),
    (
        "quantifier",
        &[Pos::Det, Pos::Num, Pos::Adj, Pos::Pron],
        &["CD", "PDT"],
    ),
    ("pronoun", &[Pos::Pron], &["PRP", "PRP$", "WP", "WDT"]),
    ("adv", &[Pos::Adv], &[]),
    ("adj", &[Pos::Adj], &[]),
    ("verb", &[Pos::Verb], &[]),
    ("noun", &[Pos::Noun, Pos::Propn], &[]),
];

impl Default for CategoryRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryRules {
    /// Rules for the requirement-smell categories; the table order is also
    /// the priority order.
    pub fn builtin() -> Self {
        let rules = BUILTIN
            .iter()
            .map(|(name, pos, tags)| {
                let rule = CategoryRule {
                    pos: pos.iter().copied().collect(),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                };
                (name.to_string(), rule)
            })
            .collect();
        let priority = BUILTIN.iter().map(|(name, ..)| name.to_string()).collect();
        Self::from_parts(rules, priority)
    }

    /// Build from explicit parts. Priority entries are case-folded like
    /// category names; duplicates are rejected.
    pub fn new(
        rules: BTreeMap<String, CategoryRule>,
        priority: Vec<String>,
    ) -> Result<Self, RulesError> {
        let mut seen = BTreeSet::new();
        for name in &priority {
            if !seen.insert(name.to_lowercase()) {
                return Err(RulesError::DuplicatePriority(name.clone()));
            }
        }
        let rules = rules
            .into_iter()
            .map(|(name, rule)| (name.to_lowercase(), rule))
            .collect();
        let priority = priority.iter().map(|name| name.to_lowercase()).collect();
        Ok(Self::from_parts(rules, priority))
    }

    /// Load a JSON rules file. Its contents replace the built-in rules.
    ///
    /// ```json
    /// { "priority": ["vague", "adj"],
    ///   "categories": { "vague": { "pos": ["ADJ", "ADV"] }, "adj": { "pos": ["ADJ"] } } }
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RulesFile = serde_json::from_str(&raw).map_err(|source| RulesError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_file(file)
    }

    /// Parse rules from a JSON string (same format as [`Self::from_json_file`]).
    pub fn from_json_str(raw: &str) -> Result<Self, RulesError> {
        let file: RulesFile = serde_json::from_str(raw).map_err(|source| RulesError::Json {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::from_file(file)
    }

    fn from_file(file: RulesFile) -> Result<Self, RulesError> {
        let mut rules = BTreeMap::new();
        for (category, entry) in file.categories {
            let mut rule = CategoryRule::default();
            for tag in entry.pos {
                let pos = Pos::from_tag(&tag).ok_or_else(|| RulesError::UnknownPos {
                    category: category.clone(),
                    tag: tag.clone(),
                })?;
                rule.pos.insert(pos);
            }
            rule.tags = entry.tags.into_iter().map(|t| t.trim().to_string()).collect();
            rules.insert(category, rule);
        }
        Self::new(rules, file.priority)
    }

    fn from_parts(rules: BTreeMap<String, CategoryRule>, priority: Vec<String>) -> Self {
        let rank = priority
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self {
            rules,
            priority,
            rank,
        }
    }

    /// Rule declared for `category`; categories without one never match a
    /// single token.
    pub fn rule(&self, category: &str) -> Option<&CategoryRule> {
        self.rules.get(category)
    }

    /// Position in the priority order, `None` for unlisted categories.
    pub fn rank(&self, category: &str) -> Option<usize> {
        self.rank.get(category).copied()
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategoryRule)> + '_ {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Order candidate categories: listed ones by priority, then unlisted
    /// ones by name.
    pub fn sort_by_priority(&self, categories: &mut [&str]) {
        categories.sort_by(|a, b| {
            let ra = self.rank(a).unwrap_or(usize::MAX);
            let rb = self.rank(b).unwrap_or(usize::MAX);
            ra.cmp(&rb).then_with(|| a.cmp(b))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_priority_puts_verb_forms_first() {
        let rules = CategoryRules::builtin();
        assert_eq!(rules.priority().first().map(String::as_str), Some("vpastp"));
        assert_eq!(rules.priority().last().map(String::as_str), Some("noun"));
        assert!(rules.rank("vpastp") < rules.rank("verb"));
        assert_eq!(rules.rank("custom"), None);
    }

    #[test]
    fn rules_accept_pos_or_tag() {
        let rules = CategoryRules::builtin();
        let weak = rules.rule("weak").unwrap();
        assert!(weak.accepts(Pos::Aux, "VBZ"));
        assert!(weak.accepts(Pos::Verb, "MD"));
        assert!(!weak.accepts(Pos::Verb, "VB"));
        assert!(rules.rule("vpastp").unwrap().accepts(Pos::Verb, "VBN"));
        assert!(!rules.rule("vpastp").unwrap().accepts(Pos::Verb, "VBD"));
    }

    #[test]
    fn unlisted_categories_sort_last_by_name() {
        let rules = CategoryRules::builtin();
        let mut cats = vec!["zeta", "verb", "alpha", "vpastp"];
        rules.sort_by_priority(&mut cats);
        assert_eq!(cats, vec!["vpastp", "verb", "alpha", "zeta"]);
    }

    #[test]
    fn json_rules_replace_builtins() {
        let rules = CategoryRules::from_json_str(
            r#"{"priority": ["Vague"], "categories": {"Vague": {"pos": ["adj"], "tags": ["RB"]}}}"#,
        )
        .unwrap();
        assert_eq!(rules.priority(), ["vague".to_string()]);
        let vague = rules.rule("vague").unwrap();
        assert!(vague.accepts(Pos::Adj, "JJ"));
        assert!(vague.accepts(Pos::Noun, "RB"));
        assert!(rules.rule("adj").is_none());
    }

    #[test]
    fn json_rules_reject_unknown_pos_and_duplicates() {
        let err = CategoryRules::from_json_str(r#"{"categories": {"x": {"pos": ["ADJECTIVE"]}}}"#)
            .unwrap_err();
        assert!(matches!(err, RulesError::UnknownPos { ref tag, .. } if tag == "ADJECTIVE"));

        let err = CategoryRules::from_json_str(r#"{"priority": ["a", "A"]}"#).unwrap_err();
        assert!(matches!(err, RulesError::DuplicatePriority(_)));
    }

    #[test]
    fn missing_rules_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CategoryRules::from_json_file(dir.path().join("rules.json")).unwrap_err();
        assert!(matches!(err, RulesError::Io { .. }));
    }
}
