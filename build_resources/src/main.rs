use std::fs;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use log::info;
use text_quality::scorer::{QGramScorer, TokenDictionary};
use text_quality::OcrTokenizer;

#[derive(Parser, Debug)]
#[command(
    about = "A program to build a token dictionary and a q-gram list from a text corpus.",
    group = ArgGroup::new("outputs").required(true).multiple(true),
)]
struct Args {
    /// A plain text corpus in the target language
    #[arg(long, required = true)]
    text: Vec<PathBuf>,

    /// The file to write the token dictionary to
    #[arg(long, group = "outputs")]
    dict_out: Option<PathBuf>,

    /// The file to write the ranked q-grams to
    #[arg(long, group = "outputs")]
    qgrams_out: Option<PathBuf>,

    /// Maximum number of q-grams to write
    #[arg(long, default_value = "1000")]
    max_rank: usize,

    /// Write dictionary tokens in arbitrary order
    #[arg(long)]
    no_sort: bool,

    /// Overwrite existing output files
    #[arg(long)]
    overwrite: bool,

    /// Log level or filter directives
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    let mut corpus = String::new();
    for path in &args.text {
        info!("Loading corpus {path:?}...");
        corpus.push_str(&fs::read_to_string(path)?);
        corpus.push('\n');
    }

    if let Some(path) = &args.dict_out {
        let dict = TokenDictionary::from_text(&corpus, &OcrTokenizer);
        info!("# of tokens: {}", dict.len());
        dict.to_file(path, !args.no_sort, args.overwrite)?;
    }

    if let Some(path) = &args.qgrams_out {
        let q_grams = QGramScorer::from_text(&corpus, &OcrTokenizer, args.max_rank);
        info!("# of q-grams: {}", q_grams.as_slice().len());
        q_grams.to_file(path, args.overwrite)?;
    }

    Ok(())
}
