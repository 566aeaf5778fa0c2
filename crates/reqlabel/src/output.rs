//! The labeled dataset table.

use std::io::Write;

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};

use crate::pipeline::Label;
use crate::requirement::Requirement;

pub const DELIMITER: u8 = b';';

pub const HEADER: [&str; 6] = [
    "ID",
    "ID progetto",
    "REQUISITO (testo)",
    "Classe dei requisiti",
    "CATEGORIA",
    "PAROLA",
];

/// Category and word of the row written for a requirement without matches.
pub const NULL: &str = "NULL";

/// Output rows for one requirement: one per label, or a single `NULL` row.
pub fn rows<'a>(req: &'a Requirement, labels: &'a [Label]) -> Vec<[&'a str; 6]> {
    let base = |category: &'a str, word: &'a str| {
        [
            req.id.as_str(),
            req.project_id.as_str(),
            req.text.as_str(),
            req.class.as_str(),
            category,
            word,
        ]
    };
    if labels.is_empty() {
        return vec![base(NULL, NULL)];
    }
    labels
        .iter()
        .map(|label| base(&label.category, &label.word))
        .collect()
}

/// Streams rows as `;`-separated values. Fields are quoted only when they
/// contain the delimiter, a double quote or a line break.
pub struct LabelWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> LabelWriter<W> {
    /// Wrap `writer` and emit the header row.
    pub fn new(writer: W) -> Result<Self> {
        let mut inner = WriterBuilder::new()
            .delimiter(DELIMITER)
            .quote_style(QuoteStyle::Necessary)
            .has_headers(false)
            .from_writer(writer);
        inner.write_record(HEADER).context("write header")?;
        Ok(Self { inner })
    }

    /// Write the rows of one requirement; returns how many were written.
    pub fn write_requirement(&mut self, req: &Requirement, labels: &[Label]) -> Result<usize> {
        let rows = rows(req, labels);
        for row in &rows {
            self.inner.write_record(row)?;
        }
        Ok(rows.len())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().context("flush output")
    }
}
