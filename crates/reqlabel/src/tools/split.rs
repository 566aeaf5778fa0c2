//! Split a labeled table into one file per category.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{info, warn};

use crate::output::{DELIMITER, NULL};

pub const CATEGORY_COLUMN: &str = "CATEGORIA";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SplitStats {
    pub rows_read: usize,
    /// Rows written per category.
    pub categories: BTreeMap<String, usize>,
    pub files_written: usize,
}

/// `Vague Terms` → `vague_terms_requirements.csv`.
pub fn category_file_name(category: &str) -> String {
    format!("{}_requirements.csv", category.to_lowercase().replace(' ', "_"))
}

pub fn split_by_category(input: &Path, output_dir: &Path) -> Result<SplitStats> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("open labeled dataset {}", input.display()))?;

    let mut records = reader.records();
    let header = records
        .next()
        .ok_or_else(|| anyhow!("{} has no header row", input.display()))?
        .with_context(|| format!("read header of {}", input.display()))?;
    let column = header
        .iter()
        .position(|field| field == CATEGORY_COLUMN)
        .ok_or_else(|| {
            anyhow!(
                "{} has no `{CATEGORY_COLUMN}` column",
                input.display()
            )
        })?;

    let mut stats = SplitStats::default();
    let mut groups: BTreeMap<String, Vec<StringRecord>> = BTreeMap::new();
    for record in records {
        let record = record.with_context(|| format!("read {}", input.display()))?;
        let Some(category) = record.get(column).map(str::to_string) else {
            continue;
        };
        if category != NULL {
            groups.entry(category).or_default().push(record);
        }
        stats.rows_read += 1;
    }
    info!(
        "read {} rows, found {} categories",
        stats.rows_read,
        groups.len()
    );

    if groups.is_empty() {
        warn!("no labeled rows with a category; nothing to write");
        return Ok(stats);
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;

    for (category, rows) in &groups {
        let path = output_dir.join(category_file_name(category));
        match write_rows(&path, &header, rows) {
            Ok(()) => {
                info!("wrote {} rows to {}", rows.len(), path.display());
                stats.categories.insert(category.clone(), rows.len());
                stats.files_written += 1;
            }
            Err(err) => warn!("category '{category}': {err:#}"),
        }
    }
    Ok(stats)
}

fn write_rows(path: &Path, header: &StringRecord, rows: &[StringRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
