use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use reqlabel_types::{Pos, Token};
use serde::Deserialize;
use tracing::{debug, info};

use crate::Annotator;

#[derive(Deserialize)]
struct Record {
    text: String,
    tokens: Vec<RecordToken>,
}

#[derive(Deserialize)]
struct RecordToken {
    text: String,
    /// Character (not byte) offset into the record text.
    idx: usize,
    lemma: String,
    pos: String,
    tag: String,
}

/// Annotations produced ahead of time by an external tagger.
///
/// The file holds one JSON object per line:
/// `{"text": "...", "tokens": [{"text", "idx", "lemma", "pos", "tag"}]}`.
/// Texts that are not in the file go to the fallback annotator, if any.
#[derive(Default)]
pub struct PrecomputedAnnotator {
    by_text: HashMap<String, Vec<Token>>,
    fallback: Option<Box<dyn Annotator + Send + Sync>>,
}

impl std::fmt::Debug for PrecomputedAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrecomputedAnnotator")
            .field("texts", &self.by_text.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl PrecomputedAnnotator {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("open annotations {}", path.display()))?;
        let annotator = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("load annotations {}", path.display()))?;
        info!(
            "loaded pre-computed annotations for {} texts from {}",
            annotator.len(),
            path.display()
        );
        Ok(annotator)
    }

    /// Parse JSON lines; blank lines are skipped, anything else malformed
    /// fails with the line number.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut by_text = HashMap::new();
        for (lineno, line) in reader.lines().enumerate() {
            let lineno = lineno + 1;
            let line = line.with_context(|| format!("read line {lineno}"))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(&line).with_context(|| format!("parse line {lineno}"))?;
            let tokens = convert(&record).with_context(|| format!("line {lineno}"))?;
            if by_text.insert(record.text, tokens).is_some() {
                debug!("line {lineno}: duplicate text replaces an earlier annotation");
            }
        }
        Ok(Self {
            by_text,
            fallback: None,
        })
    }

    /// Annotate unknown texts with `fallback` instead of failing.
    pub fn with_fallback<A>(mut self, fallback: A) -> Self
    where
        A: Annotator + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }
}

impl Annotator for PrecomputedAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<Token>> {
        if let Some(tokens) = self.by_text.get(text) {
            return Ok(tokens.clone());
        }
        match &self.fallback {
            Some(fallback) => fallback.annotate(text),
            None => bail!("no pre-computed annotation for text: {text:?}"),
        }
    }
}

fn convert(record: &Record) -> Result<Vec<Token>> {
    let text = record.text.as_str();
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect();

    record
        .tokens
        .iter()
        .map(|tok| {
            let start = *boundaries.get(tok.idx).ok_or_else(|| {
                anyhow!("token {:?} starts past the end of the text", tok.text)
            })?;
            let end = start + tok.text.len();
            if text.get(start..end) != Some(tok.text.as_str()) {
                bail!(
                    "token {:?} at character {} does not match the text",
                    tok.text,
                    tok.idx
                );
            }
            let pos: Pos = tok
                .pos
                .parse()
                .with_context(|| format!("token {:?}", tok.text))?;
            Ok(Token::new(
                tok.text.clone(),
                start,
                tok.lemma.clone(),
                pos,
                tok.tag.clone(),
            ))
        })
        .collect()
}
