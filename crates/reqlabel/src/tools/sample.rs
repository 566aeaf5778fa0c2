//! Draw a fixed-size random sample from every per-category file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::output::DELIMITER;

pub const DEFAULT_SAMPLE_SIZE: usize = 27;

#[derive(Clone, Debug)]
pub struct SampleOptions {
    pub sample_size: usize,
    /// Fixed seed for reproducible samples; a random one is drawn and logged
    /// otherwise.
    pub seed: Option<u64>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SampleStats {
    pub files: usize,
    pub skipped_files: usize,
    pub rows: usize,
    pub seed: u64,
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("input directory {} not found", dir.display());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        bail!("no .csv files in {}", dir.display());
    }
    Ok(files)
}

/// Header and data rows of one `;`-separated file.
fn read_table(path: &Path) -> Result<Option<(StringRecord, Vec<StringRecord>)>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut records = reader.records();
    let Some(header) = records.next().transpose()? else {
        return Ok(None);
    };
    let rows = records.collect::<Result<Vec<_>, _>>()?;
    Ok(Some((header, rows)))
}

/// Sample every `*.csv` of `input_dir` (in name order) into `output`.
///
/// Files with at most `sample_size` rows are copied whole. The header of
/// the first readable file is written once. Sampled rows keep their order
/// in the source file.
pub fn sample_dir(input_dir: &Path, output: &Path, options: &SampleOptions) -> Result<SampleStats> {
    let files = csv_files(input_dir)?;
    info!("found {} category files", files.len());

    let seed = options.seed.unwrap_or_else(rand::random);
    if options.seed.is_none() {
        info!("sampling with random seed {seed}");
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let file = File::create(output).with_context(|| format!("create {}", output.display()))?;
    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_writer(file);

    let mut stats = SampleStats {
        seed,
        ..SampleStats::default()
    };
    let mut header_written = false;
    for path in &files {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let (header, rows) = match read_table(path) {
            Ok(Some(table)) => table,
            Ok(None) => {
                warn!("{name}: empty file, skipped");
                stats.skipped_files += 1;
                continue;
            }
            Err(err) => {
                warn!("{name}: {err:#}, skipped");
                stats.skipped_files += 1;
                continue;
            }
        };
        if !header_written {
            writer
                .write_record(&header)
                .with_context(|| format!("write {}", output.display()))?;
            header_written = true;
        }
        if rows.is_empty() {
            warn!("{name}: header only, skipped");
            stats.skipped_files += 1;
            continue;
        }

        let picked: Vec<&StringRecord> = if rows.len() <= options.sample_size {
            info!("{name}: {} rows, taking all", rows.len());
            rows.iter().collect()
        } else {
            info!(
                "{name}: {} rows, sampling {}",
                rows.len(),
                options.sample_size
            );
            let mut idx = index::sample(&mut rng, rows.len(), options.sample_size).into_vec();
            idx.sort_unstable();
            idx.into_iter().map(|i| &rows[i]).collect()
        };
        for row in &picked {
            writer
                .write_record(*row)
                .with_context(|| format!("write {}", output.display()))?;
        }
        stats.files += 1;
        stats.rows += picked.len();
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", output.display()))?;
    info!(
        "selected {} rows from {} files into {}",
        stats.rows,
        stats.files,
        output.display()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_category(dir: &Path, name: &str, rows: usize) {
        let mut body = String::from("ID;CATEGORIA;PAROLA\n");
        for i in 0..rows {
            body.push_str(&format!("R{i};{name};w{i}\n"));
        }
        fs::write(dir.join(format!("{name}_requirements.csv")), body).unwrap();
    }

    #[test]
    fn small_files_are_copied_whole_and_large_ones_sampled() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cats");
        fs::create_dir(&input).unwrap();
        write_category(&input, "adj", 3);
        write_category(&input, "vague", 40);
        let output = dir.path().join("sample.csv");

        let options = SampleOptions {
            sample_size: 5,
            seed: Some(7),
        };
        let stats = sample_dir(&input, &output, &options).unwrap();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.rows, 8);
        assert_eq!(stats.seed, 7);

        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text.matches("ID;CATEGORIA;PAROLA").count(), 1);
        assert_eq!(text.lines().filter(|l| l.contains(";adj;")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.contains(";vague;")).count(), 5);
    }

    #[test]
    fn same_seed_gives_same_sample() {
        let dir = tempfile::tempdir().unwrap();
        write_category(dir.path(), "vague", 50);
        let out_a = tempfile::NamedTempFile::new().unwrap();
        let out_b = tempfile::NamedTempFile::new().unwrap();
        let options = SampleOptions {
            sample_size: 10,
            seed: Some(42),
        };
        sample_dir(dir.path(), out_a.path(), &options).unwrap();
        sample_dir(dir.path(), out_b.path(), &options).unwrap();
        assert_eq!(
            fs::read_to_string(out_a.path()).unwrap(),
            fs::read_to_string(out_b.path()).unwrap()
        );
    }

    #[test]
    fn missing_or_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.csv");
        assert!(sample_dir(&dir.path().join("nope"), &output, &SampleOptions::default()).is_err());
        let err = sample_dir(dir.path(), &output, &SampleOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no .csv files"));
    }
}
