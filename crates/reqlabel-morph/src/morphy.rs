//! Morphy-style lemmatization.
//!
//! Check exceptions, apply suffix rules, and verify candidates via a
//! caller-provided lemma existence predicate. When nothing can be verified,
//! [`Morphy::lemmatize`] falls back to a deterministic guess so every token
//! still gets a lemma.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqlabel_types::Pos;

/// Where a candidate lemma originated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CandidateSource {
    Surface,
    Exception,
    Rule {
        suffix: &'static str,
        replacement: &'static str,
    },
}

/// A lemma candidate paired with its POS and provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LemmaCandidate<'a> {
    pub pos: Pos,
    pub lemma: Cow<'a, str>,
    pub source: CandidateSource,
}

/// Exception lists per open word class plus the built-in suffix rules.
#[derive(Clone, Debug)]
pub struct Morphy {
    exceptions: HashMap<Pos, HashMap<String, Vec<String>>>,
}

impl Default for Morphy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Morphy {
    /// Morphy with the built-in irregular forms only.
    pub fn builtin() -> Self {
        let mut exceptions: HashMap<Pos, HashMap<String, Vec<String>>> = HashMap::new();
        for (pos, table) in [
            (Pos::Noun, NOUN_EXCEPTIONS),
            (Pos::Verb, VERB_EXCEPTIONS),
            (Pos::Adj, ADJ_EXCEPTIONS),
            (Pos::Adv, ADV_EXCEPTIONS),
        ] {
            let map = exceptions.entry(pos).or_default();
            for (surface, lemma) in table {
                map.entry((*surface).to_string())
                    .or_default()
                    .push((*lemma).to_string());
            }
        }
        Self { exceptions }
    }

    /// Built-in forms extended with exception lists (`*.exc`) from a directory.
    ///
    /// Files are optional; missing ones are treated as empty. Entries from the
    /// files take precedence over the built-in ones.
    pub fn load(exc_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = exc_dir.as_ref();
        let mut morphy = Self::builtin();
        for (pos, name) in [
            (Pos::Noun, "noun.exc"),
            (Pos::Verb, "verb.exc"),
            (Pos::Adj, "adj.exc"),
            (Pos::Adv, "adv.exc"),
        ] {
            let loaded = load_exc(dir.join(name))?;
            morphy.exceptions.entry(pos).or_default().extend(loaded);
        }
        Ok(morphy)
    }

    /// Generate verified lemmas for a surface form, with provenance.
    pub fn lemmas_for<'a, F>(
        &'a self,
        pos: Pos,
        surface: &str,
        lemma_exists: F,
    ) -> Vec<LemmaCandidate<'a>>
    where
        F: Fn(Pos, &str) -> bool,
    {
        let mut seen: HashSet<Cow<'a, str>> = HashSet::new();
        let mut out: Vec<LemmaCandidate<'a>> = Vec::new();
        let norm_surface = normalize(surface);

        if lemma_exists(pos, &norm_surface) {
            push_unique(
                &mut out,
                &mut seen,
                LemmaCandidate {
                    pos,
                    lemma: Cow::Owned(norm_surface.clone()),
                    source: CandidateSource::Surface,
                },
            );
        }

        if let Some(entries) = self.exception(pos, &norm_surface) {
            for lemma in entries {
                if lemma_exists(pos, lemma.as_str()) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            pos,
                            lemma: Cow::Borrowed(lemma.as_str()),
                            source: CandidateSource::Exception,
                        },
                    );
                }
            }
        }

        for (suffix, replacement) in rules_for(pos) {
            if let Some(candidate) = apply_rule(&norm_surface, suffix, replacement)
                && lemma_exists(pos, &candidate)
            {
                push_unique(
                    &mut out,
                    &mut seen,
                    LemmaCandidate {
                        pos,
                        lemma: Cow::Owned(candidate),
                        source: CandidateSource::Rule {
                            suffix,
                            replacement,
                        },
                    },
                );
            }
        }

        out
    }

    /// Pick one lemma for an inflected surface form.
    ///
    /// Verified exception/rule candidates win over the surface form itself;
    /// then an unverified exception; then a spelling-based guess.
    pub fn lemmatize<F>(&self, pos: Pos, surface: &str, lemma_exists: F) -> String
    where
        F: Fn(Pos, &str) -> bool,
    {
        let norm_surface = normalize(surface);
        let candidates = self.lemmas_for(pos, &norm_surface, lemma_exists);
        if let Some(found) = candidates
            .iter()
            .find(|c| c.source != CandidateSource::Surface)
        {
            return found.lemma.to_string();
        }
        if !candidates.is_empty() {
            return norm_surface;
        }
        if let Some(lemma) = self
            .exception(pos, &norm_surface)
            .and_then(|entries| entries.first())
        {
            return lemma.clone();
        }
        guess(pos, &norm_surface).unwrap_or(norm_surface)
    }

    /// Whether `surface` is a listed irregular form for `pos`.
    pub fn is_exception(&self, pos: Pos, surface: &str) -> bool {
        self.exception(pos, &normalize(surface)).is_some()
    }

    fn exception(&self, pos: Pos, norm_surface: &str) -> Option<&Vec<String>> {
        self.exceptions
            .get(&pos)
            .and_then(|map| map.get(norm_surface))
    }
}

fn load_exc(path: PathBuf) -> Result<HashMap<String, Vec<String>>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file =
        File::open(&path).with_context(|| format!("open exception file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut map = HashMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let mut parts = line.split_whitespace();
        let surface = match parts.next() {
            Some(s) => normalize(s),
            None => continue,
        };
        let lemmas: Vec<String> = parts.map(normalize).collect();
        if !lemmas.is_empty() {
            map.insert(surface, lemmas);
        }
    }
    Ok(map)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn push_unique<'a>(
    out: &mut Vec<LemmaCandidate<'a>>,
    seen: &mut HashSet<Cow<'a, str>>,
    candidate: LemmaCandidate<'a>,
) {
    if seen.insert(candidate.lemma.clone()) {
        out.push(candidate);
    }
}

fn apply_rule(surface: &str, suffix: &str, replacement: &str) -> Option<String> {
    let stem = surface.strip_suffix(suffix)?;
    if stem.is_empty() {
        return None;
    }
    let mut candidate = if replacement.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}{replacement}")
    };

    // Inflected forms double the final consonant ("running" -> "runn").
    if replacement.is_empty() && ends_doubled(&candidate) {
        candidate.pop();
    }

    Some(candidate)
}

fn ends_doubled(word: &str) -> bool {
    let mut chars = word.chars();
    match (chars.next_back(), chars.next_back()) {
        (Some(a), Some(b)) => a == b && !matches!(a, 'a' | 'e' | 'i' | 'o' | 'u' | 'l' | 's'),
        _ => false,
    }
}

fn rules_for(pos: Pos) -> &'static [(&'static str, &'static str)] {
    match pos {
        Pos::Noun | Pos::Propn => &[
            ("s", ""),
            ("ses", "s"),
            ("xes", "x"),
            ("zes", "z"),
            ("ches", "ch"),
            ("shes", "sh"),
            ("men", "man"),
            ("ies", "y"),
        ],
        Pos::Verb | Pos::Aux => &[
            ("s", ""),
            ("ies", "y"),
            ("es", "e"),
            ("es", ""),
            ("ed", "e"),
            ("ed", ""),
            ("ied", "y"),
            ("ing", "e"),
            ("ing", ""),
        ],
        Pos::Adj | Pos::Adv => &[
            ("er", ""),
            ("er", "e"),
            ("est", ""),
            ("est", "e"),
            ("ier", "y"),
            ("iest", "y"),
        ],
        _ => &[],
    }
}

/// Spelling-based lemma when nothing could be verified.
fn guess(pos: Pos, surface: &str) -> Option<String> {
    let strip = |suffix: &str| surface.strip_suffix(suffix).filter(|s| s.len() >= 2);
    match pos {
        Pos::Noun | Pos::Propn => {
            if let Some(stem) = strip("ies") {
                return Some(format!("{stem}y"));
            }
            for suffix in ["sses", "xes", "zes", "ches", "shes"] {
                if let Some(stem) = strip(suffix) {
                    return Some(format!("{stem}{}", &suffix[..suffix.len() - 2]));
                }
            }
            if surface.ends_with("ss") || surface.ends_with("us") || surface.ends_with("is") {
                return None;
            }
            strip("s").map(str::to_string)
        }
        Pos::Verb | Pos::Aux => {
            if let Some(stem) = strip("ies").or_else(|| strip("ied")) {
                return Some(format!("{stem}y"));
            }
            for suffix in ["ing", "ed"] {
                if let Some(stem) = strip(suffix) {
                    return Some(restore_stem(stem));
                }
            }
            for suffix in ["sses", "xes", "zes", "ches", "shes"] {
                if let Some(stem) = strip(suffix) {
                    return Some(format!("{stem}{}", &suffix[..suffix.len() - 2]));
                }
            }
            if surface.ends_with("ss") {
                return None;
            }
            strip("s").map(str::to_string)
        }
        Pos::Adj | Pos::Adv => {
            if let Some(stem) = strip("iest").or_else(|| strip("ier")) {
                return Some(format!("{stem}y"));
            }
            strip("est")
                .or_else(|| strip("er"))
                .map(restore_stem)
        }
        _ => None,
    }
}

/// Undo consonant doubling or a dropped silent `e` after stripping a suffix.
fn restore_stem(stem: &str) -> String {
    let mut out = stem.to_string();
    if ends_doubled(&out) {
        out.pop();
        return out;
    }
    const NEEDS_E: [&str; 22] = [
        "at", "iz", "ys", "ur", "ir", "id", "ud", "ag", "ng", "rg", "dg", "lv", "rv", "av",
        "iv", "ov", "uc", "rc", "nc", "bl", "pl", "tl",
    ];
    if out == "us" || NEEDS_E.iter().any(|end| out.ends_with(end)) {
        out.push('e');
    }
    out
}

const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("criteria", "criterion"),
    ("indices", "index"),
    ("analyses", "analysis"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("phenomena", "phenomenon"),
];

const VERB_EXCEPTIONS: &[(&str, &str)] = &[
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("went", "go"),
    ("gone", "go"),
    ("made", "make"),
    ("got", "get"),
    ("gotten", "get"),
    ("gave", "give"),
    ("given", "give"),
    ("took", "take"),
    ("taken", "take"),
    ("ran", "run"),
    ("wrote", "write"),
    ("written", "write"),
    ("sent", "send"),
    ("built", "build"),
    ("kept", "keep"),
    ("left", "leave"),
    ("found", "find"),
    ("held", "hold"),
    ("shown", "show"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("began", "begin"),
    ("begun", "begin"),
    ("knew", "know"),
    ("known", "know"),
    ("saw", "see"),
    ("seen", "see"),
    ("came", "come"),
    ("became", "become"),
    ("brought", "bring"),
    ("thought", "think"),
    ("told", "tell"),
    ("said", "say"),
    ("paid", "pay"),
    ("met", "meet"),
    ("led", "lead"),
    ("lost", "lose"),
    ("meant", "mean"),
    ("sold", "sell"),
    ("stood", "stand"),
    ("understood", "understand"),
    ("bought", "buy"),
    ("caught", "catch"),
    ("taught", "teach"),
    ("fed", "feed"),
    ("hid", "hide"),
    ("hidden", "hide"),
    ("broke", "break"),
    ("broken", "break"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("drew", "draw"),
    ("drawn", "draw"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("dealt", "deal"),
    ("withdrew", "withdraw"),
    ("withdrawn", "withdraw"),
    ("overridden", "override"),
    ("rewritten", "rewrite"),
];

const ADJ_EXCEPTIONS: &[(&str, &str)] = &[
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
    ("further", "far"),
    ("farther", "far"),
    ("furthest", "far"),
    ("farthest", "far"),
];

const ADV_EXCEPTIONS: &[(&str, &str)] = &[
    ("better", "well"),
    ("best", "well"),
    ("further", "far"),
    ("farther", "far"),
];
