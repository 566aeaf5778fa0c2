use std::collections::HashSet;

use anyhow::Result;
use reqlabel_types::{Pos, Token};

use crate::lexicon::{self, LexEntry};
use crate::morphy::Morphy;
use crate::tokenize::{Piece, PieceKind, tokenize};
use crate::Annotator;

/// Deterministic annotator built from a closed-class lexicon, suffix
/// heuristics and a little left context.
///
/// Good enough to drive dictionary labeling of requirement sentences; it is
/// not a general-purpose tagger. Lemmas come from [`Morphy`], verified
/// against the built-in lexicon plus an optional vocabulary.
#[derive(Clone, Debug, Default)]
pub struct RuleAnnotator {
    morphy: Morphy,
    vocabulary: HashSet<String>,
}

/// Left context carried from one token to the next.
#[derive(Default)]
struct Context {
    /// After a modal, infinitival `to` or auxiliary `do`.
    expects_base_verb: bool,
    /// Lemma of the last `be`/`have`/`get` form, while it can still govern a
    /// participle.
    governing_aux: Option<String>,
}

impl Context {
    fn advance(&mut self, token: &Token) {
        match token.pos {
            Pos::Adv | Pos::Part if token.tag != "POS" => {}
            _ if token.tag == "MD" || token.tag == "TO" => {
                self.expects_base_verb = true;
                self.governing_aux = None;
            }
            Pos::Aux if token.lemma == "do" => {
                self.expects_base_verb = true;
                self.governing_aux = None;
            }
            Pos::Aux | Pos::Verb if matches!(token.lemma.as_str(), "be" | "have" | "get") => {
                self.expects_base_verb = false;
                self.governing_aux = Some(token.lemma.clone());
            }
            _ => {
                self.expects_base_verb = false;
                self.governing_aux = None;
            }
        }
    }
}

impl RuleAnnotator {
    pub fn new(morphy: Morphy) -> Self {
        Self {
            morphy,
            vocabulary: HashSet::new(),
        }
    }

    /// Extra lemmas accepted when verifying lemmatizer candidates.
    pub fn with_vocabulary<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.vocabulary
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    fn knows(&self, pos: Pos, lemma: &str) -> bool {
        lexicon::knows(pos, lemma) || self.vocabulary.contains(lemma)
    }

    fn lemma(&self, pos: Pos, lower: &str) -> String {
        self.morphy.lemmatize(pos, lower, |p, l| self.knows(p, l))
    }

    fn tag_closed(
        &self,
        entry: LexEntry,
        lower: &str,
        prev: Option<&Token>,
        next: Option<&str>,
    ) -> (Pos, &'static str, String) {
        let fixed = (entry.pos, entry.tag, entry.lemma.to_string());
        match lower {
            "that" => {
                if prev.is_some_and(|t| t.pos.is_nominal() && t.tag != "PRP$") {
                    (Pos::Pron, "WDT", "that".into())
                } else if next.and_then(lexicon::closed_class).is_some_and(|e| {
                    matches!(e.pos, Pos::Det | Pos::Pron) || e.tag == "MD"
                }) {
                    (Pos::Sconj, "IN", "that".into())
                } else {
                    fixed
                }
            }
            "'s" if prev.is_some_and(|t| t.pos == Pos::Pron) => (Pos::Aux, "VBZ", "be".into()),
            _ if matches!(entry.lemma, "have" | "do") && !self.looks_verbal(next) => {
                (Pos::Verb, entry.tag, entry.lemma.to_string())
            }
            _ => fixed,
        }
    }

    /// Whether the next word can continue an auxiliary construction.
    fn looks_verbal(&self, next: Option<&str>) -> bool {
        let Some(word) = next else {
            return false;
        };
        matches!(word, "not" | "n't" | "been" | "be" | "to")
            || word.ends_with("ed")
            || word.ends_with("en")
            || lexicon::is_verb(word)
            || self.morphy.is_exception(Pos::Verb, word)
            || lexicon::is_adverb(word)
            || word.ends_with("ly")
    }

    fn tag_open(
        &self,
        piece: &Piece<'_>,
        lower: &str,
        prev: Option<&Token>,
        next: Option<&str>,
        sentence_start: bool,
        ctx: &Context,
    ) -> (Pos, &'static str, String) {
        let subject_before = prev.is_some_and(|t| {
            matches!(t.pos, Pos::Noun | Pos::Propn)
                || (t.pos == Pos::Pron
                    && matches!(t.tag.as_str(), "PRP" | "NN" | "WP" | "WDT" | "EX"))
        });

        match lower {
            "to" => {
                let infinitive = next.is_some_and(|w| {
                    lexicon::is_verb(w)
                        || lexicon::closed_class(w).is_some_and(|e| e.pos == Pos::Aux)
                });
                return if infinitive {
                    (Pos::Part, "TO", "to".into())
                } else {
                    (Pos::Adp, "IN", "to".into())
                };
            }
            "more" | "most" | "less" | "least" => {
                let graded = next.is_some_and(|w| {
                    lexicon::is_adjective(w)
                        || lexicon::is_adverb(w)
                        || w.ends_with("ly")
                        || has_adjective_suffix(w)
                });
                let superlative = lower.ends_with("st");
                return match (graded, superlative) {
                    (true, false) => (Pos::Adv, "RBR", lower.into()),
                    (true, true) => (Pos::Adv, "RBS", lower.into()),
                    (false, false) => (Pos::Adj, "JJR", lower.into()),
                    (false, true) => (Pos::Adj, "JJS", lower.into()),
                };
            }
            _ => {}
        }

        if lexicon::is_adverb(lower) || (ctx.expects_base_verb && is_ly_adverb(lower)) {
            return (Pos::Adv, "RB", lower.into());
        }

        if ctx.expects_base_verb {
            return (Pos::Verb, "VB", self.lemma(Pos::Verb, lower));
        }

        if ctx.governing_aux.is_some() {
            if lower.ends_with("ed") || is_irregular_participle(&self.morphy, lower) {
                return (Pos::Verb, "VBN", self.lemma(Pos::Verb, lower));
            }
            if is_gerund(lower) {
                return (Pos::Verb, "VBG", self.lemma(Pos::Verb, lower));
            }
        }

        // Known adjectives keep their class when capitalised or shouted.
        if lexicon::is_adjective(lower) {
            return (Pos::Adj, "JJ", lower.into());
        }

        if is_acronym(piece.text) || (!sentence_start && starts_upper(piece.text)) {
            return (Pos::Propn, "NNP", piece.text.to_string());
        }

        if let Some((tag, lemma)) = self.graded_adjective(lower) {
            return (Pos::Adj, tag, lemma);
        }

        if is_ly_adverb(lower) {
            return (Pos::Adv, "RB", lower.into());
        }

        if is_gerund(lower) {
            return if prev.is_some_and(|t| t.pos == Pos::Det) {
                (Pos::Noun, "NN", lower.into())
            } else {
                (Pos::Verb, "VBG", self.lemma(Pos::Verb, lower))
            };
        }

        if lexicon::is_verb(lower) {
            return if sentence_start {
                (Pos::Verb, "VB", lower.into())
            } else if subject_before {
                (Pos::Verb, "VBP", lower.into())
            } else {
                (Pos::Noun, "NN", lower.into())
            };
        }

        if is_past(lower) || is_irregular_participle(&self.morphy, lower) {
            let tag = if subject_before { "VBD" } else { "VBN" };
            return (Pos::Verb, tag, self.lemma(Pos::Verb, lower));
        }

        if has_adjective_suffix(lower) {
            return (Pos::Adj, "JJ", lower.into());
        }

        if is_plural_like(lower) {
            let stem = self.lemma(Pos::Verb, lower);
            if subject_before && stem != lower && self.knows(Pos::Verb, &stem) {
                return (Pos::Verb, "VBZ", stem);
            }
            return (Pos::Noun, "NNS", self.lemma(Pos::Noun, lower));
        }

        (Pos::Noun, "NN", lower.into())
    }

    /// Comparative or superlative of a known adjective ("faster", "best").
    fn graded_adjective(&self, lower: &str) -> Option<(&'static str, String)> {
        let candidates = self
            .morphy
            .lemmas_for(Pos::Adj, lower, |_, l| lexicon::is_adjective(l));
        let base = candidates.iter().find(|c| c.lemma != lower)?;
        let tag = if lower.ends_with("st") { "JJS" } else { "JJR" };
        Some((tag, base.lemma.to_string()))
    }
}

impl Annotator for RuleAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<Token>> {
        let pieces = tokenize(text);
        let lowers: Vec<String> = pieces.iter().map(|p| fold(p.text)).collect();
        let mut tokens: Vec<Token> = Vec::with_capacity(pieces.len());
        let mut ctx = Context::default();

        for (idx, piece) in pieces.iter().enumerate() {
            let lower = lowers[idx].as_str();
            let next = lowers.get(idx + 1).map(String::as_str);
            let prev = tokens.last();
            let sentence_start = prev.is_none_or(|t| matches!(t.tag.as_str(), "." | ":" | "``"));

            let (pos, tag, lemma) = match piece.kind {
                PieceKind::Number => (Pos::Num, "CD", lower.to_string()),
                PieceKind::Punct => (Pos::Punct, punct_tag(piece.text), piece.text.to_string()),
                PieceKind::Symbol => (Pos::Sym, symbol_tag(piece.text), piece.text.to_string()),
                PieceKind::Word | PieceKind::Clitic => match lexicon::closed_class(lower) {
                    Some(entry) => self.tag_closed(entry, lower, prev, next),
                    None => self.tag_open(piece, lower, prev, next, sentence_start, &ctx),
                },
            };

            let token = Token::new(piece.text, piece.offset, lemma, pos, tag);
            ctx.advance(&token);
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Lower-case and fold typographic apostrophes.
fn fold(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

fn punct_tag(text: &str) -> &'static str {
    match text {
        "." | "!" | "?" => ".",
        "," => ",",
        ":" | ";" => ":",
        "(" | "[" | "{" => "-LRB-",
        ")" | "]" | "}" => "-RRB-",
        "-" | "\u{2013}" | "\u{2014}" => "HYPH",
        "\"" | "'" | "`" | "\u{201C}" | "\u{2018}" => "``",
        "\u{201D}" | "\u{2019}" => "''",
        _ => "NFP",
    }
}

fn symbol_tag(text: &str) -> &'static str {
    match text {
        "$" | "\u{20AC}" | "\u{00A3}" => "$",
        "#" => "#",
        _ => "SYM",
    }
}

fn starts_upper(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

/// "GUI", "HTTP2": at least two characters, all upper-case letters or digits.
fn is_acronym(text: &str) -> bool {
    text.chars().count() >= 2
        && text.chars().any(char::is_alphabetic)
        && text.chars().all(|c| c.is_uppercase() || c.is_ascii_digit())
}

fn is_ly_adverb(lower: &str) -> bool {
    const NOT_ADVERBS: [&str; 9] = [
        "family", "supply", "reply", "apply", "assembly", "anomaly", "july", "italy", "rely",
    ];
    lower.len() > 4 && lower.ends_with("ly") && !NOT_ADVERBS.contains(&lower)
}

fn is_gerund(lower: &str) -> bool {
    const NOT_GERUNDS: [&str; 10] = [
        "thing", "string", "spring", "king", "ring", "morning", "evening", "ceiling", "wing",
        "swing",
    ];
    lower.len() > 4 && lower.ends_with("ing") && !NOT_GERUNDS.contains(&lower)
}

fn is_past(lower: &str) -> bool {
    const NOT_PAST: [&str; 8] = [
        "speed", "feed", "seed", "bed", "red", "shed", "embed", "proceed",
    ];
    lower.len() > 3 && lower.ends_with("ed") && !NOT_PAST.contains(&lower)
}

fn is_irregular_participle(morphy: &Morphy, lower: &str) -> bool {
    morphy.is_exception(Pos::Verb, lower)
}

fn has_adjective_suffix(lower: &str) -> bool {
    const SUFFIXES: [&str; 7] = ["able", "ible", "ful", "ous", "ive", "less", "ical"];
    const NOT_ADJECTIVES: [&str; 4] = ["table", "cable", "archive", "drive"];
    SUFFIXES
        .iter()
        .any(|s| lower.len() >= s.len() + 3 && lower.ends_with(s))
        && !NOT_ADJECTIVES.contains(&lower)
}

fn is_plural_like(lower: &str) -> bool {
    lower.len() > 3
        && lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyse(text: &str) -> Vec<(String, Pos, String, String)> {
        RuleAnnotator::default()
            .annotate(text)
            .unwrap()
            .into_iter()
            .map(|t| (t.text, t.pos, t.tag, t.lemma))
            .collect()
    }

    fn find<'a>(tokens: &'a [(String, Pos, String, String)], word: &str) -> &'a (String, Pos, String, String) {
        tokens.iter().find(|t| t.0 == word).unwrap()
    }

    #[test]
    fn tags_simple_sentence() {
        let tokens = analyse("The quick fox jumps");
        assert_eq!(tokens[0].1, Pos::Det);
        assert_eq!(find(&tokens, "quick").1, Pos::Adj);
        assert_eq!(find(&tokens, "fox").1, Pos::Noun);
        let jumps = find(&tokens, "jumps");
        assert_eq!((jumps.1, jumps.2.as_str(), jumps.3.as_str()), (Pos::Verb, "VBZ", "jump"));
    }

    #[test]
    fn modal_and_passive_constructions() {
        let tokens = analyse("The data shall be stored and users must not log in.");
        let shall = find(&tokens, "shall");
        assert_eq!((shall.1, shall.2.as_str()), (Pos::Aux, "MD"));
        let stored = find(&tokens, "stored");
        assert_eq!((stored.1, stored.2.as_str(), stored.3.as_str()), (Pos::Verb, "VBN", "store"));
        let log = find(&tokens, "log");
        assert_eq!((log.1, log.2.as_str()), (Pos::Verb, "VB"));
        assert_eq!(find(&tokens, "not").1, Pos::Part);
        assert_eq!(find(&tokens, ".").1, Pos::Punct);
    }

    #[test]
    fn grades_adjectives_and_adverbs() {
        let tokens = analyse("It runs faster than the best tool, more quickly");
        let faster = find(&tokens, "faster");
        assert_eq!((faster.2.as_str(), faster.3.as_str()), ("JJR", "fast"));
        let best = find(&tokens, "best");
        assert_eq!((best.2.as_str(), best.3.as_str()), ("JJS", "good"));
        let more = find(&tokens, "more");
        assert_eq!((more.1, more.2.as_str()), (Pos::Adv, "RBR"));
        assert_eq!(find(&tokens, "quickly").1, Pos::Adv);
    }

    #[test]
    fn gerunds_proper_nouns_and_clitics() {
        let tokens = analyse("Users can't keep using the GUI in Windows");
        let using = find(&tokens, "using");
        assert_eq!((using.2.as_str(), using.3.as_str()), ("VBG", "use"));
        assert_eq!(find(&tokens, "GUI").2, "NNP");
        assert_eq!(find(&tokens, "Windows").1, Pos::Propn);
        let neg = find(&tokens, "n't");
        assert_eq!((neg.1, neg.3.as_str()), (Pos::Part, "not"));
        assert_eq!(find(&tokens, "Users").2, "NNS");
    }

    #[test]
    fn capitalised_adjectives_stay_adjectives() {
        let tokens = analyse("It is quick, Quick and QUICK for the GUI");
        for word in ["quick", "Quick", "QUICK"] {
            let tok = find(&tokens, word);
            assert_eq!((tok.1, tok.2.as_str(), tok.3.as_str()), (Pos::Adj, "JJ", "quick"));
        }
        assert_eq!(find(&tokens, "GUI").1, Pos::Propn);
    }

    #[test]
    fn vocabulary_verifies_lemmas() {
        let annotator = RuleAnnotator::default().with_vocabulary(["archive"]);
        let tokens = annotator.annotate("Records are archived").unwrap();
        let archived = tokens.iter().find(|t| t.text == "archived").unwrap();
        assert_eq!(archived.tag, "VBN");
        assert_eq!(archived.lemma, "archive");
    }

    #[test]
    fn offsets_index_the_source_text() {
        let text = "  The  system's logs — rotated.";
        let tokens = RuleAnnotator::default().annotate(text).unwrap();
        for token in tokens {
            assert_eq!(&text[token.span()], token.text);
        }
    }
}
