//! Shared types describing annotated requirement text.
//!
//! A [`Token`] is one unit produced by a grammatical annotator: its surface
//! text, the byte offset where it starts in the requirement, its lemma, a
//! coarse [`Pos`] tag and a fine-grained tag string (Penn Treebank style,
//! e.g. `VBN`, `JJS`). Offsets always index the *original* text so the
//! surface form can be recovered with `&text[token.span()]`.
//!
//! ```rust
//! use reqlabel_types::{Pos, Token};
//!
//! let pos: Pos = "ADJ".parse().unwrap();
//! let tok = Token::new("quick", 4, "quick", pos, "JJ");
//! assert_eq!(tok.span(), 4..9);
//! assert_eq!(tok.pos.as_str(), "ADJ");
//! ```

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Coarse part-of-speech tag (Universal Dependencies tag set).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
    Space,
}

impl Pos {
    pub const ALL: [Pos; 18] = [
        Pos::Adj,
        Pos::Adp,
        Pos::Adv,
        Pos::Aux,
        Pos::Cconj,
        Pos::Det,
        Pos::Intj,
        Pos::Noun,
        Pos::Num,
        Pos::Part,
        Pos::Pron,
        Pos::Propn,
        Pos::Punct,
        Pos::Sconj,
        Pos::Sym,
        Pos::Verb,
        Pos::X,
        Pos::Space,
    ];

    /// Parse an upper- or lower-case tag name such as `ADJ` or `propn`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Pos::ALL
            .into_iter()
            .find(|pos| pos.as_str().eq_ignore_ascii_case(tag))
    }

    /// Canonical upper-case tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::X => "X",
            Pos::Space => "SPACE",
        }
    }

    /// Nouns, proper nouns and pronouns: the usual subjects of a clause.
    pub fn is_nominal(self) -> bool {
        matches!(self, Pos::Noun | Pos::Propn | Pos::Pron)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known POS tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownPos(pub String);

impl fmt::Display for UnknownPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown part-of-speech tag: {}", self.0)
    }
}

impl std::error::Error for UnknownPos {}

impl FromStr for Pos {
    type Err = UnknownPos;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pos::from_tag(s).ok_or_else(|| UnknownPos(s.to_string()))
    }
}

/// One annotated token of a requirement text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    /// Surface text exactly as it appears in the requirement.
    pub text: String,
    /// Byte offset of the first character in the requirement text.
    pub offset: usize,
    pub lemma: String,
    pub pos: Pos,
    /// Fine-grained tag, e.g. `VBN`.
    pub tag: String,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        offset: usize,
        lemma: impl Into<String>,
        pos: Pos,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            offset,
            lemma: lemma.into(),
            pos,
            tag: tag.into(),
        }
    }

    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn span(&self) -> Range<usize> {
        self.offset..self.end()
    }
}
