use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use reqlabel::rate_limit::RateLimiterLayer;
use reqlabel::tools::{self, IdOptions, SampleOptions};
use reqlabel::{
    AppState, LabelContext, SharedAnnotator, build_annotator, label_file, router,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

#[derive(Parser)]
#[command(name = "reqlabel", version)]
#[command(about = "Label requirement datasets with linguistic categories")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where dictionaries, rules and lemma data come from.
#[derive(Args)]
struct SourceArgs {
    /// Directory of `<category>.txt` word lists.
    #[arg(long, env = "REQLABEL_DICTIONARIES", default_value = "NewDict")]
    dictionaries: PathBuf,
    /// JSON category rules replacing the built-in ones.
    #[arg(long, env = "REQLABEL_RULES")]
    rules: Option<PathBuf>,
    /// Directory with `noun.exc`, `verb.exc`, `adj.exc`, `adv.exc`.
    #[arg(long, env = "REQLABEL_EXCEPTIONS")]
    exceptions: Option<PathBuf>,
    /// JSON-lines file of pre-computed token annotations.
    #[arg(long, env = "REQLABEL_ANNOTATIONS")]
    annotations: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Label every requirement of a dataset.
    Label {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, env = "REQLABEL_INPUT", default_value = "Dataset_With_R_ID.txt")]
        input: PathBuf,
        #[arg(long, env = "REQLABEL_OUTPUT", default_value = "Labeled_Dataset.csv")]
        output: PathBuf,
    },
    /// Prefix raw requirement lines with `R<n>:` ids.
    AssignIds {
        #[arg(long, default_value = "Dataset.arff")]
        input: PathBuf,
        #[arg(long, default_value = "Dataset_With_R_ID.txt")]
        output: PathBuf,
        #[arg(long, default_value = "R")]
        prefix: String,
        #[arg(long, default_value_t = 1)]
        start_from: u64,
        #[arg(long, default_value_t = false)]
        keep_blank_lines: bool,
        /// Replace ids that are already present.
        #[arg(long, default_value_t = false)]
        retag: bool,
    },
    /// Write one file per category of a labeled dataset.
    Split {
        #[arg(long, default_value = "Labeled_Dataset.csv")]
        input: PathBuf,
        #[arg(long, default_value = "Sorted_by_Categories")]
        output_dir: PathBuf,
    },
    /// Sample a fixed number of rows from every category file.
    Sample {
        #[arg(long, default_value = "Sorted_by_Categories")]
        input_dir: PathBuf,
        #[arg(long, default_value = "Requisiti_Selezionati.csv")]
        output: PathBuf,
        #[arg(long, default_value_t = tools::DEFAULT_SAMPLE_SIZE)]
        sample_size: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Merge two word lists and report their overlap.
    MergeDicts {
        first: PathBuf,
        second: PathBuf,
        #[arg(long, default_value = "vague.txt")]
        output: PathBuf,
        #[arg(long, default_value = "statistiche_file_uniti.txt")]
        report: PathBuf,
    },
    /// Serve labeling over HTTP.
    Serve {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, env = "RATE_LIMIT_RPS", default_value_t = DEFAULT_RATE_LIMIT_RPS,
              value_parser = clap::value_parser!(u32).range(1..))]
        rate_limit_rps: u32,
        #[arg(long, env = "RATE_LIMIT_BURST", default_value_t = DEFAULT_RATE_LIMIT_BURST,
              value_parser = clap::value_parser!(u32).range(1..))]
        rate_limit_burst: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Label {
            source,
            input,
            output,
        } => {
            let (ctx, annotator) = load_context(&source)?;
            label_file(&ctx, annotator.as_ref(), &input, &output)?;
        }
        Commands::AssignIds {
            input,
            output,
            prefix,
            start_from,
            keep_blank_lines,
            retag,
        } => {
            let options = IdOptions {
                prefix,
                start_from,
                keep_blank_lines,
                skip_if_tagged: !retag,
            };
            let written = tools::assign_ids_file(&input, &output, &options)?;
            println!("Requirements written: {written}");
            println!("Output: {}", output.display());
        }
        Commands::Split { input, output_dir } => {
            let stats = tools::split_by_category(&input, &output_dir)?;
            println!(
                "Created {} files in {}",
                stats.files_written,
                output_dir.display()
            );
        }
        Commands::Sample {
            input_dir,
            output,
            sample_size,
            seed,
        } => {
            let options = SampleOptions { sample_size, seed };
            let stats = tools::sample_dir(&input_dir, &output, &options)?;
            println!(
                "Selected {} rows from {} files into {} (seed {})",
                stats.rows,
                stats.files,
                output.display(),
                stats.seed
            );
        }
        Commands::MergeDicts {
            first,
            second,
            output,
            report,
        } => {
            let merged = tools::merge_word_lists(&first, &second, &output, &report)?;
            println!("{merged}");
        }
        Commands::Serve {
            source,
            host,
            port,
            rate_limit_rps,
            rate_limit_burst,
        } => serve(&source, &host, port, rate_limit_rps, rate_limit_burst).await?,
    }
    Ok(())
}

fn load_context(source: &SourceArgs) -> Result<(LabelContext, SharedAnnotator)> {
    let start = Instant::now();
    info!("using dictionaries at {}", source.dictionaries.display());
    let ctx = LabelContext::load(&source.dictionaries, source.rules.as_deref())?;
    let annotator = build_annotator(
        &ctx,
        source.exceptions.as_deref(),
        source.annotations.as_deref(),
    )?;
    info!(
        "{} categories loaded in {} ms",
        ctx.dictionary.categories().len(),
        start.elapsed().as_millis()
    );
    Ok((ctx, annotator))
}

async fn serve(
    source: &SourceArgs,
    host: &str,
    port: u16,
    rate_limit_rps: u32,
    rate_limit_burst: u32,
) -> Result<()> {
    let (ctx, annotator) = load_context(source)?;
    let state = AppState {
        ctx: Arc::new(ctx),
        annotator,
    };

    info!("binding to {host}:{port}");
    info!("rate limit: {rate_limit_rps} req/s (burst {rate_limit_burst})");
    let rate_limiter = RateLimiterLayer::new(rate_limit_rps, rate_limit_burst);
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
