use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sift_core::{Bm25Params, IndexError, InvertedIndex, ScoredDoc, DOCUMENT_SUFFIX};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Build, save and query a TF-IDF / BM25 term index", long_about = None)]
struct Cli {
    /// Path to input data: a .txt document, a directory of them, or a saved index
    data_in: PathBuf,
    /// If set, save the index to this path
    #[arg(short = 's', long)]
    save_to: Option<PathBuf>,
    /// Ranking function used by the query loop
    #[arg(long, value_enum, default_value_t = Scorer::Bm25)]
    scorer: Scorer,
    /// BM25 term-frequency saturation
    #[arg(long, default_value_t = 2.0)]
    k1: f64,
    /// BM25 length normalization (0 disables it)
    #[arg(long, default_value_t = 0.75)]
    b: f64,
    /// Print results as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Skip dumping the index contents before the query loop
    #[arg(long, default_value_t = false)]
    no_display: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Scorer {
    Bm25,
    Tfidf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let index = index_from_input(&cli.data_in)
        .with_context(|| format!("could not build index from {}", cli.data_in.display()))?;
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "index ready");

    if let Some(path) = &cli.save_to {
        index.save(path).with_context(|| format!("saving index to {}", path.display()))?;
    }
    if !cli.no_display {
        print!("{}", index.display());
    }

    query_loop(&index, &cli)
}

/// Document suffix first, then directory, then saved index.
fn index_from_input(data_in: &Path) -> sift_core::Result<InvertedIndex> {
    let mut index = InvertedIndex::new();
    if data_in.to_string_lossy().ends_with(DOCUMENT_SUFFIX) {
        index.index_document(data_in)?;
    } else if data_in.is_dir() {
        index.index_directory(data_in)?;
    } else if data_in.is_file() {
        index.load(data_in).map_err(|e| match e {
            IndexError::CorruptIndex { reason } => IndexError::UnsupportedInput { path: data_in.to_path_buf(), reason },
            other => other,
        })?;
    } else {
        return Err(IndexError::NotFound { path: data_in.to_path_buf() });
    }
    Ok(index)
}

fn run_query(index: &InvertedIndex, query: &str, cli: &Cli) -> sift_core::Result<Vec<ScoredDoc>> {
    match cli.scorer {
        Scorer::Tfidf => Ok(index.query_tfidf(query)),
        Scorer::Bm25 => index.query_bm25(query, Bm25Params { k1: cli.k1, b: cli.b }),
    }
}

fn query_loop(index: &InvertedIndex, cli: &Cli) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("query: ") {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(query);
                let results = run_query(index, query, cli).with_context(|| format!("query {query:?} failed"))?;
                if cli.json {
                    println!("{}", serde_json::to_string(&results)?);
                } else {
                    print!("{}", render_results(&results));
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn render_results(results: &[ScoredDoc]) -> String {
    if results.is_empty() {
        return "  no matches returned\n".to_string();
    }
    let pad = results.iter().map(|r| r.doc_id.chars().count()).max().unwrap_or(0) + 2;
    let mut out = format!("  {:>pad$}  score\n", "document");
    for r in results {
        out.push_str(&format!("  {:>pad$}  {}\n", r.doc_id, format_score(r.score)));
    }
    out
}

/// Four significant digits, fixed-point keeping at least one decimal,
/// scientific for very large or very small magnitudes.
fn format_score(score: f64) -> String {
    if score == 0.0 || !score.is_finite() {
        return format!("{score:.1}");
    }
    let exp = score.abs().log10().floor() as i32;
    if !(-4..4).contains(&exp) {
        let sci = format!("{score:.3e}");
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }
    let decimals = (3 - exp).max(0) as usize;
    let fixed = format!("{score:.decimals$}");
    if !fixed.contains('.') {
        return format!("{fixed}.0");
    }
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}
