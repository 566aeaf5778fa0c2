//! Merge two word lists of the same category and compare them.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

/// Trimmed, lower-cased, non-blank lines of `path`. A missing file reads as
/// an empty set.
pub fn read_word_set(path: &Path) -> Result<BTreeSet<String>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!("word list {} not found", path.display());
            return Ok(BTreeSet::new());
        }
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_lowercase)
        .collect())
}

/// Overlap between two word lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeReport {
    pub first: String,
    pub second: String,
    pub union: BTreeSet<String>,
    pub common: BTreeSet<String>,
    pub only_first: usize,
    pub only_second: usize,
}

impl MergeReport {
    pub fn compare(
        first: impl Into<String>,
        a: &BTreeSet<String>,
        second: impl Into<String>,
        b: &BTreeSet<String>,
    ) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            union: a.union(b).cloned().collect(),
            common: a.intersection(b).cloned().collect(),
            only_first: a.difference(b).count(),
            only_second: b.difference(a).count(),
        }
    }

    /// Common words as a share of the union, in percent.
    pub fn common_percentage(&self) -> f64 {
        if self.union.is_empty() {
            return 0.0;
        }
        self.common.len() as f64 / self.union.len() as f64 * 100.0
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Word list comparison ---")?;
        writeln!(f)?;
        writeln!(f, "File 1: '{}'", self.first)?;
        writeln!(f, "File 2: '{}'", self.second)?;
        writeln!(f, "----------------------------")?;
        writeln!(f)?;
        writeln!(f, "Common words: {}", self.common.len())?;
        writeln!(
            f,
            "Common words over all unique words: {:.2}%",
            self.common_percentage()
        )?;
        writeln!(f)?;
        writeln!(f, "Words only in the first file: {}", self.only_first)?;
        writeln!(f, "Words only in the second file: {}", self.only_second)?;
        writeln!(f)?;
        if self.common.is_empty() {
            writeln!(f, "Common word list: none")
        } else {
            writeln!(f, "Common word list:")?;
            for word in &self.common {
                writeln!(f, "- {word}")?;
            }
            Ok(())
        }
    }
}

/// Write the sorted union of `first` and `second` to `output` and the
/// comparison report to `report_path`.
pub fn merge_word_lists(
    first: &Path,
    second: &Path,
    output: &Path,
    report_path: &Path,
) -> Result<MergeReport> {
    let a = read_word_set(first)?;
    let b = read_word_set(second)?;
    if a.is_empty() && b.is_empty() {
        bail!(
            "both word lists are empty or missing: {} and {}",
            first.display(),
            second.display()
        );
    }

    let report = MergeReport::compare(
        first.display().to_string(),
        &a,
        second.display().to_string(),
        &b,
    );

    let mut merged = String::new();
    for word in &report.union {
        merged.push_str(word);
        merged.push('\n');
    }
    fs::write(output, merged).with_context(|| format!("write {}", output.display()))?;
    info!(
        "wrote {} unique words to {}",
        report.union.len(),
        output.display()
    );

    fs::write(report_path, report.to_string())
        .with_context(|| format!("write {}", report_path.display()))?;
    info!("wrote comparison report to {}", report_path.display());
    Ok(report)
}
