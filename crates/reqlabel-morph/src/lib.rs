//! Grammatical annotation of requirement text.
//!
//! The labeling core only needs, for every token, its surface text, byte
//! offset, lemma and tags. That capability sits behind the [`Annotator`]
//! trait so callers can plug in whatever produces it:
//!
//! - [`RuleAnnotator`]: a self-contained tokenizer and rule tagger with a
//!   morphy-style lemmatizer ([`Morphy`]).
//! - [`PrecomputedAnnotator`]: token streams produced ahead of time by an
//!   external tagger and stored as JSON lines, with an optional fallback.
//!
//! # Example
//! ```
//! use reqlabel_morph::{Annotator, RuleAnnotator};
//! use reqlabel_types::Pos;
//!
//! # fn main() -> anyhow::Result<()> {
//! let annotator = RuleAnnotator::default();
//! let tokens = annotator.annotate("The data shall be stored")?;
//! let stored = tokens.last().unwrap();
//! assert_eq!((stored.pos, stored.tag.as_str()), (Pos::Verb, "VBN"));
//! assert_eq!(stored.lemma, "store");
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p reqlabel-morph --example lookup -- [--exceptions <dir>] <text>`.

pub mod lexicon;
mod morphy;
mod precomputed;
mod rule;
pub mod tokenize;

use std::sync::Arc;

use anyhow::Result;
use reqlabel_types::Token;

pub use morphy::{CandidateSource, LemmaCandidate, Morphy};
pub use precomputed::PrecomputedAnnotator;
pub use rule::RuleAnnotator;

/// Produces tokens with lemma and part-of-speech tags for a text.
///
/// Token offsets are byte offsets into `text` and tokens come in text order.
pub trait Annotator {
    fn annotate(&self, text: &str) -> Result<Vec<Token>>;
}

impl<A: Annotator + ?Sized> Annotator for &A {
    fn annotate(&self, text: &str) -> Result<Vec<Token>> {
        (**self).annotate(text)
    }
}

impl<A: Annotator + ?Sized> Annotator for Box<A> {
    fn annotate(&self, text: &str) -> Result<Vec<Token>> {
        (**self).annotate(text)
    }
}

impl<A: Annotator + ?Sized> Annotator for Arc<A> {
    fn annotate(&self, text: &str) -> Result<Vec<Token>> {
        (**self).annotate(text)
    }
}
