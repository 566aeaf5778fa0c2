//! Give every raw requirement line an `R<n>:` id.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

#[derive(Clone, Debug)]
pub struct IdOptions {
    pub prefix: String,
    pub start_from: u64,
    pub keep_blank_lines: bool,
    /// Keep ids already present (upper-cased); when false, tagged lines are
    /// stripped and numbered again.
    pub skip_if_tagged: bool,
}

impl Default for IdOptions {
    fn default() -> Self {
        Self {
            prefix: "R".to_string(),
            start_from: 1,
            keep_blank_lines: false,
            skip_if_tagged: true,
        }
    }
}

/// Split `R<digits>\s*:\s*rest` (case-insensitive `R`) into id and rest.
fn existing_id(line: &str) -> Option<(&str, &str)> {
    let rest = line
        .strip_prefix('R')
        .or_else(|| line.strip_prefix('r'))?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let tail = rest[digits..].trim_start().strip_prefix(':')?;
    Some((&line[..1 + digits], tail.trim()))
}

/// Copy `reader` to `writer`, numbering requirements. Returns how many
/// requirement lines were written.
pub fn assign_ids<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    options: &IdOptions,
) -> Result<usize> {
    let mut counter = options.start_from;
    let mut written = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read line {}", idx + 1))?;
        let mut line = line.trim();
        if line.is_empty() {
            if options.keep_blank_lines {
                writeln!(writer)?;
            }
            continue;
        }
        // ARFF comments and declarations.
        if line.starts_with('%') || line.starts_with('@') {
            continue;
        }
        if let Some((id, rest)) = existing_id(line) {
            if options.skip_if_tagged {
                writeln!(writer, "{}: {rest}", id.to_uppercase())?;
                written += 1;
                continue;
            }
            line = rest;
        }
        writeln!(writer, "{}{counter}: {line}", options.prefix)?;
        counter += 1;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

pub fn assign_ids_file(input: &Path, output: &Path, options: &IdOptions) -> Result<usize> {
    let reader = File::open(input)
        .map(BufReader::new)
        .with_context(|| format!("open {}", input.display()))?;
    let writer = File::create(output)
        .map(BufWriter::new)
        .with_context(|| format!("create {}", output.display()))?;
    let written = assign_ids(reader, writer, options)?;
    info!(
        "wrote {written} requirements with ids to {}",
        output.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, options: &IdOptions) -> (String, usize) {
        let mut out = Vec::new();
        let n = assign_ids(input.as_bytes(), &mut out, options).unwrap();
        (String::from_utf8(out).unwrap(), n)
    }

    #[test]
    fn numbers_untagged_lines_and_skips_comments() {
        let input = "% comment\n@relation reqs\n\n  1,'First',F  \n1,'Second',NF\n";
        let (out, n) = run(input, &IdOptions::default());
        assert_eq!(out, "R1: 1,'First',F\nR2: 1,'Second',NF\n");
        assert_eq!(n, 2);
    }

    #[test]
    fn keeps_existing_ids_upper_cased() {
        let (out, n) = run("r5 :  some text\nmore\n", &IdOptions::default());
        assert_eq!(out, "R5: some text\nR1: more\n");
        assert_eq!(n, 2);
    }

    #[test]
    fn tagged_output_is_stable_when_run_again() {
        let (once, _) = run("R5: some text\n", &IdOptions::default());
        let (twice, _) = run(&once, &IdOptions::default());
        assert_eq!(once, "R5: some text\n");
        assert_eq!(twice, once);
    }

    #[test]
    fn retag_replaces_existing_ids() {
        let options = IdOptions {
            prefix: "Q".into(),
            start_from: 10,
            keep_blank_lines: true,
            skip_if_tagged: false,
        };
        let (out, n) = run("R5: a\n\nb\n", &options);
        assert_eq!(out, "Q10: a\n\nQ11: b\n");
        assert_eq!(n, 2);
    }

    #[test]
    fn ids_need_digits_and_a_colon() {
        assert_eq!(existing_id("R12 : x"), Some(("R12", "x")));
        assert_eq!(existing_id("R: x"), None);
        assert_eq!(existing_id("R12 x"), None);
        assert_eq!(existing_id("Requirement: x"), None);
    }
}
