use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use reqlabel_dict::Dictionary;

fn main() -> Result<()> {
    let dict_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p reqlabel-dict --example stats -- <path-to-dictionary-dir>")?;

    let dict = Dictionary::load(&dict_dir);

    println!("Dictionary: {}", dict_dir.display());
    println!("Categories    : {}", dict.categories().len());
    println!("Single words  : {}", dict.singles().len());
    println!("Phrases       : {}", dict.phrases().len());
    for (category, stats) in dict.categories() {
        println!(
            "  {:<16} words {:>6}  phrases {:>6}",
            category, stats.words, stats.phrases
        );
    }

    // Spot-check a sentence to confirm phrase lookup.
    let sample = "The system shall be user-friendly and respond as quickly as possible.";
    for m in dict.phrases().find_phrases(sample) {
        println!("Phrase '{}' ({}) at {}..{}", m.text, m.category, m.start, m.end);
    }

    Ok(())
}
