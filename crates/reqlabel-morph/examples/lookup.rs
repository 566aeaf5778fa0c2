use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use reqlabel_morph::{Annotator, CandidateSource, Morphy, RuleAnnotator, lexicon};
use reqlabel_types::Pos;

const USAGE: &str =
    "usage: cargo run -p reqlabel-morph --example lookup -- [--exceptions <dir>] [--demo | <text>]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1).peekable();
    let mut exc_dir: Option<PathBuf> = None;
    if args.peek().is_some_and(|a| a == "--exceptions") {
        args.next();
        exc_dir = Some(args.next().map(PathBuf::from).context(USAGE)?);
    }

    let texts: Vec<String> = match args.next() {
        Some(arg) if arg == "--demo" => vec![
            "The system shall be running on two servers".into(),
            "Users can't keep better records than the children".into(),
            "The quick fox jumps".into(),
        ],
        Some(arg) => vec![arg],
        None => bail!(USAGE),
    };
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let morphy = match &exc_dir {
        Some(dir) => Morphy::load(dir)
            .with_context(|| format!("loading exceptions from {}", dir.display()))?,
        None => Morphy::builtin(),
    };
    let annotator = RuleAnnotator::new(morphy.clone());

    for text in texts {
        println!("\nText: {text}");
        for token in annotator.annotate(&text)? {
            println!(
                "  {:>3} {:<12} {:<6} {:<5} {}",
                token.offset,
                token.text,
                token.pos.as_str(),
                token.tag,
                token.lemma
            );
            for pos in [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv] {
                let derived: Vec<_> = morphy
                    .lemmas_for(pos, &token.text, lexicon::knows)
                    .into_iter()
                    .filter(|c| c.source != CandidateSource::Surface)
                    .map(|c| format!("{} [{:?}]", c.lemma, c.source))
                    .collect();
                if !derived.is_empty() {
                    println!("        {pos}: {}", derived.join(", "));
                }
            }
        }
    }

    Ok(())
}
