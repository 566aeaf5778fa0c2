//! One labeling pass over a requirement dataset.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use bitvec::prelude::*;
use reqlabel_dict::{Dictionary, PhraseMatch};
use reqlabel_morph::{Annotator, Morphy, PrecomputedAnnotator, RuleAnnotator};
use serde::Serialize;
use tracing::{info, warn};

use crate::output::LabelWriter;
use crate::requirement::parse_requirement_line;
use crate::resolver::resolve;
use crate::rules::CategoryRules;

const PROGRESS_EVERY: usize = 100;

/// Annotator shared between the CLI and the HTTP handlers.
pub type SharedAnnotator = Arc<dyn Annotator + Send + Sync>;

/// Everything labeling reads: built once, then shared read-only.
#[derive(Clone, Debug, Default)]
pub struct LabelContext {
    pub dictionary: Dictionary,
    pub rules: CategoryRules,
}

impl LabelContext {
    pub fn new(dictionary: Dictionary, rules: CategoryRules) -> Self {
        Self { dictionary, rules }
    }

    /// Load dictionaries from `dict_dir` and rules from `rules_path`, or the
    /// built-in rules when no path is given.
    pub fn load(dict_dir: &Path, rules_path: Option<&Path>) -> Result<Self> {
        let rules = match rules_path {
            Some(path) => {
                let rules = CategoryRules::from_json_file(path)?;
                info!(
                    "loaded rules for {} categories from {}",
                    rules.categories().count(),
                    path.display()
                );
                rules
            }
            None => CategoryRules::builtin(),
        };
        let dictionary = Dictionary::load(dict_dir);
        if dictionary.is_empty() {
            warn!("no dictionary entries loaded; every requirement will get a NULL row");
        }
        for (category, stats) in dictionary.categories() {
            if stats.words > 0 && rules.rule(category).is_none() {
                warn!(
                    "category '{category}' has no grammatical rule; its single words will never match"
                );
            }
        }
        Ok(Self::new(dictionary, rules))
    }
}

/// One (category, matched text) pair of a requirement.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Label {
    pub category: String,
    pub word: String,
}

impl Label {
    pub fn new(category: impl Into<String>, word: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            word: word.into(),
        }
    }
}

/// Bytes of a text covered by phrase matches.
struct OccupiedSpans {
    mask: BitVec<usize, Lsb0>,
}

impl OccupiedSpans {
    fn new(len: usize, phrases: &[PhraseMatch]) -> Self {
        let mut mask = bitvec![usize, Lsb0; 0; len];
        for m in phrases {
            let end = m.end.min(len);
            if m.start < end {
                mask[m.start..end].fill(true);
            }
        }
        Self { mask }
    }

    /// Inclusive overlap: a span that only touches a phrase boundary counts.
    fn touches(&self, start: usize, end: usize) -> bool {
        let lo = start.saturating_sub(1);
        let hi = end.saturating_add(1).min(self.mask.len());
        lo < hi && self.mask[lo..hi].any()
    }
}

/// Labels of one requirement text, deduplicated, phrase matches first.
pub fn label_text(
    ctx: &LabelContext,
    annotator: &dyn Annotator,
    text: &str,
) -> Result<Vec<Label>> {
    let phrases = ctx.dictionary.phrases().find_phrases(text);
    let tokens = annotator.annotate(text).context("annotate text")?;
    let occupied = OccupiedSpans::new(text.len(), &phrases);

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut labels = Vec::new();
    for m in &phrases {
        if seen.insert((m.category.as_str(), m.text.as_str())) {
            labels.push(Label::new(&m.category, &m.text));
        }
    }
    for token in &tokens {
        let touched = occupied.touches(token.offset, token.end());
        let Some(category) = resolve(token, touched, ctx.dictionary.singles(), &ctx.rules) else {
            continue;
        };
        if seen.insert((category, token.text.as_str())) {
            labels.push(Label::new(category, &token.text));
        }
    }
    Ok(labels)
}

/// Counters of a labeling run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    pub requirements: usize,
    pub skipped_lines: usize,
    pub rows: usize,
    pub matches: usize,
}

/// Label every requirement line of `reader` and stream rows to `writer`.
///
/// Blank lines are ignored and lines that do not parse are skipped with a
/// warning. Any other failure aborts the run with the requirement and line
/// number in the error.
pub fn label_stream<R, W>(
    ctx: &LabelContext,
    annotator: &dyn Annotator,
    reader: R,
    writer: W,
) -> Result<RunStats>
where
    R: BufRead,
    W: Write,
{
    let mut out = LabelWriter::new(writer)?;
    let mut stats = RunStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.with_context(|| format!("read input line {lineno}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let req = match parse_requirement_line(&line) {
            Ok(req) => req,
            Err(err) => {
                warn!(
                    "line {lineno}: skipping unparseable requirement ({err}): {}",
                    line.trim()
                );
                stats.skipped_lines += 1;
                continue;
            }
        };

        let labels = label_text(ctx, annotator, &req.text)
            .with_context(|| format!("requirement {} (line {lineno})", req.id))?;
        let written = out
            .write_requirement(&req, &labels)
            .with_context(|| format!("write rows of requirement {} (line {lineno})", req.id))?;

        stats.requirements += 1;
        stats.rows += written;
        stats.matches += labels.len();
        if stats.requirements % PROGRESS_EVERY == 0 {
            info!("processed {} requirements", stats.requirements);
        }
    }

    out.flush()?;
    Ok(stats)
}

/// Label `input` into a new `output` file.
pub fn label_file(
    ctx: &LabelContext,
    annotator: &dyn Annotator,
    input: &Path,
    output: &Path,
) -> Result<RunStats> {
    let reader = File::open(input)
        .map(BufReader::new)
        .with_context(|| format!("open requirements file {}", input.display()))?;
    let writer = File::create(output)
        .map(BufWriter::new)
        .with_context(|| format!("create output file {}", output.display()))?;

    info!("labeling requirements from {}", input.display());
    let start = Instant::now();
    let stats = label_stream(ctx, annotator, reader, writer)?;
    info!(
        "labeled {} requirements in {} ms: {} matches, {} rows written to {}",
        stats.requirements,
        start.elapsed().as_millis(),
        stats.matches,
        stats.rows,
        output.display()
    );
    if stats.skipped_lines > 0 {
        warn!(
            "{} input lines could not be parsed and were skipped",
            stats.skipped_lines
        );
    }
    Ok(stats)
}

/// Build the annotator used for labeling.
///
/// The rule annotator lemmatizes with `exceptions` (or the built-in forms)
/// and verifies lemmas against the dictionary words. With `annotations`,
/// pre-computed tokens take precedence and the rule annotator covers texts
/// missing from the file.
pub fn build_annotator(
    ctx: &LabelContext,
    exceptions: Option<&Path>,
    annotations: Option<&Path>,
) -> Result<SharedAnnotator> {
    let morphy = match exceptions {
        Some(dir) => Morphy::load(dir)
            .with_context(|| format!("load lemma exceptions from {}", dir.display()))?,
        None => Morphy::builtin(),
    };
    let rule = RuleAnnotator::new(morphy).with_vocabulary(ctx.dictionary.singles().words());
    Ok(match annotations {
        Some(path) => Arc::new(PrecomputedAnnotator::load(path)?.with_fallback(rule)),
        None => Arc::new(rule),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqlabel_types::{Pos, Token};

    /// Annotator returning fixed tokens for one text.
    struct Fixed(Vec<Token>);

    impl Annotator for Fixed {
        fn annotate(&self, _text: &str) -> Result<Vec<Token>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl Annotator for Failing {
        fn annotate(&self, _text: &str) -> Result<Vec<Token>> {
            anyhow::bail!("tagger crashed")
        }
    }

    fn ctx(entries: &[(&str, &str)]) -> LabelContext {
        let mut dictionary = Dictionary::default();
        for (category, entry) in entries {
            dictionary.add_entry(category, entry);
        }
        LabelContext::new(dictionary, CategoryRules::builtin())
    }

    #[test]
    fn repeated_phrases_are_reported_once() {
        let ctx = ctx(&[("vague", "as needed")]);
        let labels = label_text(&ctx, &Fixed(vec![]), "Retry as needed, log as needed").unwrap();
        assert_eq!(labels, vec![Label::new("vague", "as needed")]);
    }

    #[test]
    fn tokens_inside_phrases_are_not_labeled_again() {
        let ctx = ctx(&[("vague", "user friendly"), ("adj", "friendly")]);
        let text = "Make it user-friendly";
        let tokens = vec![
            Token::new("Make", 0, "make", Pos::Verb, "VB"),
            Token::new("it", 5, "it", Pos::Pron, "PRP"),
            Token::new("user", 8, "user", Pos::Noun, "NN"),
            Token::new("-", 12, "-", Pos::Punct, "HYPH"),
            Token::new("friendly", 13, "friendly", Pos::Adj, "JJ"),
        ];
        let labels = label_text(&ctx, &Fixed(tokens), text).unwrap();
        assert_eq!(labels, vec![Label::new("vague", "user-friendly")]);
    }

    #[test]
    fn tokens_touching_a_phrase_boundary_are_occupied() {
        let spans = OccupiedSpans::new(
            20,
            &[PhraseMatch {
                category: "x".into(),
                start: 5,
                end: 10,
                text: "hello".into(),
            }],
        );
        assert!(spans.touches(10, 12));
        assert!(spans.touches(2, 5));
        assert!(spans.touches(6, 8));
        assert!(!spans.touches(11, 14));
        assert!(!spans.touches(0, 3));
    }

    #[test]
    fn one_token_gets_one_category() {
        let ctx = ctx(&[("adj", "quick"), ("vague", "quick")]);
        let tokens = vec![Token::new("quick", 4, "quick", Pos::Adj, "JJ")];
        let labels = label_text(&ctx, &Fixed(tokens), "The quick fox").unwrap();
        // Priority picks one category per token occurrence.
        assert_eq!(labels, vec![Label::new("vague", "quick")]);
    }

    #[test]
    fn single_words_are_deduplicated_by_surface_text() {
        let ctx = ctx(&[("adj", "quick")]);
        let tokens = vec![
            Token::new("Quick", 0, "quick", Pos::Adj, "JJ"),
            Token::new("quick", 13, "quick", Pos::Adj, "JJ"),
            Token::new("quick", 25, "quick", Pos::Adj, "JJ"),
        ];
        let labels =
            label_text(&ctx, &Fixed(tokens), "Quick start, quick exit, quick fix").unwrap();
        // Casing variants are distinct words; exact repeats collapse.
        assert_eq!(
            labels,
            vec![Label::new("adj", "Quick"), Label::new("adj", "quick")]
        );
    }

    #[test]
    fn stream_skips_bad_lines_and_writes_sentinels() {
        let ctx = ctx(&[]);
        let input = "R1: 1,'Nothing',FR\n\nnot a requirement\nR2: 1,'Still nothing',NFR\n";
        let mut out = Vec::new();
        let stats = label_stream(&ctx, &Fixed(vec![]), input.as_bytes(), &mut out).unwrap();
        assert_eq!(
            stats,
            RunStats {
                requirements: 2,
                skipped_lines: 1,
                rows: 2,
                matches: 0,
            }
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("R1;1;Nothing;FR;NULL;NULL\n"));
        assert!(text.contains("R2;1;Still nothing;NFR;NULL;NULL\n"));
    }

    #[test]
    fn annotator_failure_aborts_with_requirement_context() {
        let ctx = ctx(&[]);
        let input = "R7: 1,'Text',FR\n";
        let err = label_stream(&ctx, &Failing, input.as_bytes(), Vec::new()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("requirement R7 (line 1)"));
        assert!(msg.contains("tagger crashed"));
    }
}
