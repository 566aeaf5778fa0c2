//! Pick at most one category for a single annotated token.

use std::collections::BTreeSet;

use reqlabel_dict::{SingleTokenIndex, normalize_token};
use reqlabel_types::Token;

use crate::rules::CategoryRules;

/// Categories the dictionary lists for the token's surface text or lemma.
pub fn candidates<'a>(token: &Token, singles: &'a SingleTokenIndex) -> BTreeSet<&'a str> {
    let surface = normalize_token(&token.text);
    let lemma = normalize_token(&token.lemma);
    let mut out: BTreeSet<&str> = BTreeSet::new();
    if let Some(cats) = singles.get(&surface) {
        out.extend(cats.iter().map(String::as_str));
    }
    if lemma != surface
        && let Some(cats) = singles.get(&lemma)
    {
        out.extend(cats.iter().map(String::as_str));
    }
    out
}

/// Category for one token, or `None`.
///
/// Occupied tokens (inside a phrase match) are skipped. Otherwise the
/// candidates are tried in priority order and the first whose rule accepts
/// the token's POS or fine tag wins. Categories without a rule never match.
pub fn resolve<'a>(
    token: &Token,
    occupied: bool,
    singles: &'a SingleTokenIndex,
    rules: &CategoryRules,
) -> Option<&'a str> {
    if occupied {
        return None;
    }
    let mut ordered: Vec<&'a str> = candidates(token, singles).into_iter().collect();
    if ordered.is_empty() {
        return None;
    }
    rules.sort_by_priority(&mut ordered);
    ordered
        .into_iter()
        .find(|category| rules.rule(category).is_some_and(|rule| rule.accepts_token(token)))
}
