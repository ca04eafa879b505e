use std::collections::HashSet;
use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use text_quality::scorer::{GarbageScorer, HunspellDictionary, QGramScorer, TokenDictionary};
use text_quality::{
    Classification, Featurizer, LinearModel, PageXml, Pipeline, PipelineConfig, ResourcePaths,
    Scorers,
};

#[cfg(feature = "fasttext")]
use text_quality::FastTextLanguageClassifier;

#[derive(Parser, Debug)]
#[command(name = "classify", about = "Classify the quality of a (digitized) text.")]
struct Args {
    /// Plain text file(s) to classify. Use '-' for stdin.
    #[arg(long, short, num_args = 0.., value_name = "FILE")]
    input: Vec<PathBuf>,

    /// Input file(s) in PageXML format
    #[arg(long, num_args = 0.., value_name = "FILE")]
    pagexml: Vec<PathBuf>,

    /// A pattern to find a set of PageXML files, e.g. 'pagexml/*.xml'
    #[arg(long, alias = "glob", value_name = "PATTERN")]
    pagexml_glob: Option<String>,

    /// Output file; defaults to stdout
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output scores and text statistics
    #[arg(long)]
    output_scores: bool,

    /// Number of worker threads (0 means all cores)
    #[arg(long, default_value = "0")]
    workers: usize,

    /// Directory containing the dictionaries, q-grams, and classifier model
    #[arg(long, env = "TEXT_QUALITY_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Language the classifier was trained for
    #[arg(long, default_value = "nl")]
    language: String,

    /// Name of the Hunspell dictionary
    #[arg(long, default_value = "nl")]
    hunspell_language: String,

    /// Number of q-grams read from the q-grams file (0 reads all)
    #[arg(long, env = "Q_GRAMS_GAMMA", default_value = "1000")]
    q_grams_gamma: usize,

    /// Separator used to join the lines of PageXML documents
    #[arg(long, env = "LINE_SEPARATOR", default_value = "\n")]
    line_separator: String,

    /// Texts shorter than this (after trimming whitespace) are considered empty
    #[arg(long, default_value = "5")]
    minimum_page_length: usize,

    /// Quality class of empty pages and pages in another language
    #[arg(long, default_value = "0")]
    empty_page_output: i32,

    /// Pass empty pages and pages in another language to the classifier
    #[arg(long)]
    no_empty_page_output: bool,

    /// Pages whose lines are all shorter than this are considered broken
    #[arg(long, default_value = "5")]
    short_column_width: usize,

    /// fastText language identification model; defaults to lid.176.ftz in the temporary
    /// directory
    #[cfg(feature = "fasttext")]
    #[arg(long)]
    language_model: Option<PathBuf>,

    /// Do not check the language of the inputs
    #[cfg(feature = "fasttext")]
    #[arg(long)]
    no_language_detection: bool,

    /// Do not download the language model if it does not exist
    #[cfg(feature = "fasttext")]
    #[arg(long)]
    no_download: bool,

    /// Line predictions of the language model below this confidence are discarded
    #[cfg(feature = "fasttext")]
    #[arg(long, default_value = "0.5")]
    language_threshold: f32,

    /// Log level or filter directives
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

enum Source {
    Text(PathBuf),
    PageXml(PathBuf),
}

struct Input {
    id: String,
    source: Source,
}

enum Document {
    Text(String),
    Page(PageXml),
}

#[derive(Serialize)]
struct Row<'a> {
    filename: &'a str,
    quality_class: i32,
}

#[derive(Serialize)]
struct ScoresRow<'a> {
    filename: &'a str,
    quality_class: i32,
    confidence: f64,
    n_characters: usize,
    n_tokens: usize,
    language: &'a str,
    language_confidence: f64,
    dict_score: f64,
    dict_score_gt: f64,
    n_gram_score: f64,
    garbage_score: f64,
    reason: &'static str,
}

impl<'a> ScoresRow<'a> {
    fn new(filename: &'a str, c: &'a Classification) -> Self {
        Self {
            filename,
            quality_class: c.quality,
            confidence: c.scores.confidence,
            n_characters: c.scores.n_characters,
            n_tokens: c.scores.n_tokens,
            language: &c.scores.language,
            language_confidence: c.scores.language_confidence,
            dict_score: c.scores.dict_score,
            dict_score_gt: c.scores.dict_score_gt,
            n_gram_score: c.scores.n_gram_score,
            garbage_score: c.scores.garbage_score,
            reason: c.reason.as_str(),
        }
    }
}

fn collect_inputs(args: &Args) -> Result<Vec<Input>, Box<dyn std::error::Error>> {
    let mut pagexml = args.pagexml.clone();
    if let Some(pattern) = &args.pagexml_glob {
        for path in glob::glob(pattern)? {
            pagexml.push(path?);
        }
    }

    let sources = args
        .input
        .iter()
        .map(|path| Source::Text(path.clone()))
        .chain(pagexml.into_iter().map(Source::PageXml));

    let mut seen = HashSet::new();
    let mut inputs = vec![];
    for source in sources {
        let id = match &source {
            Source::Text(path) | Source::PageXml(path) => path.display().to_string(),
        };
        if !seen.insert(id.clone()) {
            warn!("Duplicate input '{id}', skipping.");
            continue;
        }
        inputs.push(Input { id, source });
    }
    Ok(inputs)
}

fn read_text(path: &Path) -> std::io::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = vec![];
        stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path)
    }
}

/// Loads an input. Unreadable files are treated as empty text.
fn load(input: &Input, line_separator: &str) -> Document {
    match &input.source {
        Source::Text(path) => match read_text(path) {
            Ok(bytes) => Document::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                warn!("Could not read text file {path:?}: {e}");
                Document::Text(String::new())
            }
        },
        Source::PageXml(path) => match PageXml::from_file(path) {
            Ok(page) => Document::Page(page.line_separator(line_separator)),
            Err(e) => {
                warn!("Could not parse PageXML file {path:?}: {e}");
                Document::Text(String::new())
            }
        },
    }
}

fn classify(
    pipeline: &Pipeline,
    input: &Input,
    line_separator: &str,
) -> text_quality::Result<Classification> {
    match &load(input, line_separator) {
        Document::Text(text) => pipeline.classify_with_scores(text.as_str()),
        Document::Page(page) => pipeline.classify_with_scores(page),
    }
}

/// Classifies inputs in parallel. Results are in the order of `inputs`.
fn classify_all(
    pipeline: &Pipeline,
    inputs: &[Input],
    line_separator: &str,
) -> Vec<text_quality::Result<Classification>> {
    inputs
        .par_iter()
        .map(|input| classify(pipeline, input, line_separator))
        .collect()
}

/// Writes one CSV row per input. Failed inputs get a row with only the file name.
fn write_rows<W>(
    wtr: W,
    inputs: &[Input],
    results: &[text_quality::Result<Classification>],
    output_scores: bool,
) -> Result<(), Box<dyn std::error::Error>>
where
    W: Write,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(wtr);

    let mut header = vec!["filename", "quality_class"];
    if output_scores {
        header.extend(text_quality::ClassifierScores::FIELDS);
        header.push("reason");
    }
    wtr.write_record(&header)?;

    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(c) if output_scores => wtr.serialize(ScoresRow::new(&input.id, c))?,
            Ok(c) => wtr.serialize(Row {
                filename: &input.id,
                quality_class: c.quality,
            })?,
            Err(e) => {
                error!("Failed to classify '{}': {e}", input.id);
                let mut record = vec![input.id.as_str()];
                record.resize(header.len(), "");
                wtr.write_record(&record)?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

fn build_pipeline(args: &Args) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let paths =
        ResourcePaths::from_data_dir(&args.data_dir, &args.language, &args.hunspell_language);
    paths.validate()?;

    let featurizer = Featurizer::new(Scorers {
        dict_score: HunspellDictionary::from_path(&paths.hunspell_dir, &paths.hunspell_language)?
            .into(),
        dict_score_gt: TokenDictionary::from_file(&paths.token_dict_file)?.into(),
        n_gram_score: QGramScorer::from_file(&paths.qgrams_file, args.q_grams_gamma)?,
        garbage_score: GarbageScorer,
    });

    info!("Reading classifier model from file {:?}.", paths.model_file);
    let mut f = zstd::Decoder::new(File::open(&paths.model_file)?)?;
    let model = LinearModel::read(&mut f)?;

    let config = PipelineConfig {
        minimum_page_length: args.minimum_page_length,
        empty_page_output: (!args.no_empty_page_output).then_some(args.empty_page_output),
        short_column_width: args.short_column_width,
        default_language: args.language.clone(),
    };
    let pipeline = Pipeline::new(model, featurizer, config)?;

    #[cfg(feature = "fasttext")]
    let pipeline = if args.no_language_detection {
        pipeline
    } else {
        let path = args
            .language_model
            .clone()
            .unwrap_or_else(FastTextLanguageClassifier::default_model_file);
        pipeline.language_classifier(FastTextLanguageClassifier::new(
            path,
            !args.no_download,
            args.language_threshold,
        )?)
    };

    Ok(pipeline)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    let inputs = collect_inputs(&args)?;
    let pipeline = build_pipeline(&args)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers)
        .build()?;

    info!("Classifying {} inputs.", inputs.len());
    let start = Instant::now();
    let results = pool.install(|| classify_all(&pipeline, &inputs, &args.line_separator));
    info!("Elapsed: {} [sec]", start.elapsed().as_secs_f64());

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(stdout().lock()),
    };
    write_rows(out, &inputs, &results, args.output_scores)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use text_quality::{ClassifierScores, Feature, Reason, TextQualityError};

    fn pipeline() -> Pipeline {
        let featurizer = Featurizer::new(Scorers {
            dict_score: TokenDictionary::from_tokens(["een", "tekst", "met", "fout"]).into(),
            dict_score_gt: TokenDictionary::from_tokens(["een", "tekst"]).into(),
            n_gram_score: QGramScorer::new(vec!["een".into(), "tek".into()]),
            garbage_score: GarbageScorer,
        });
        let names = Feature::ALL.iter().map(|f| f.name().to_string()).collect();
        let model = LinearModel::new(
            vec![1, 2],
            names,
            vec![vec![4.0, 0.0, 0.0, 0.0], vec![0.0; 4]],
            vec![0.0, 2.0],
        )
        .unwrap();
        Pipeline::new(model, featurizer, PipelineConfig::default()).unwrap()
    }

    fn text_input(path: &Path) -> Input {
        Input {
            id: path.display().to_string(),
            source: Source::Text(path.to_path_buf()),
        }
    }

    fn classification(quality: i32) -> Classification {
        Classification {
            quality,
            scores: ClassifierScores::filled(0.5),
            reason: Reason::Classifier,
        }
    }

    #[test]
    fn test_collect_inputs_duplicates() {
        let args = Args::try_parse_from([
            "classify", "--input", "a.txt", "b.txt", "a.txt", "--pagexml", "b.txt", "c.xml",
        ])
        .unwrap();
        let inputs = collect_inputs(&args).unwrap();
        let ids: Vec<&str> = inputs.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(vec!["a.txt", "b.txt", "c.xml"], ids);
        assert!(matches!(inputs[1].source, Source::Text(_)));
        assert!(matches!(inputs[2].source, Source::PageXml(_)));
    }

    #[test]
    fn test_load_malformed_pagexml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.xml");
        std::fs::write(&path, "<PcGts><Page><TextRegion></PcGts>").unwrap();
        let input = Input {
            id: "page.xml".into(),
            source: Source::PageXml(path),
        };
        assert!(matches!(load(&input, "\n"), Document::Text(t) if t.is_empty()));
    }

    #[test]
    fn test_load_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"Een tekst met \xe9\xe9n fout").unwrap();
        match load(&text_input(&path), "\n") {
            Document::Text(t) => {
                assert!(t.starts_with("Een tekst met "));
                assert!(t.contains('\u{FFFD}'));
                assert!(t.ends_with("n fout"));
            }
            Document::Page(_) => panic!("expected text"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = text_input(&dir.path().join("missing.txt"));
        assert!(matches!(load(&input, "\n"), Document::Text(t) if t.is_empty()));
    }

    #[test]
    fn test_classify_all() {
        let dir = tempfile::tempdir().unwrap();
        let texts: [&[u8]; 4] = [
            b"een tekst met een fout",
            b"xqzt wvrp kkhj",
            b"Een tekst met \xe9\xe9n fout",
            b"",
        ];
        let mut inputs = vec![];
        for (i, text) in texts.iter().enumerate() {
            let path = dir.path().join(format!("{i}.txt"));
            std::fs::write(&path, text).unwrap();
            inputs.push(text_input(&path));
        }
        inputs.push(text_input(&dir.path().join("missing.txt")));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .unwrap();
        let results = pool.install(|| classify_all(&pipeline(), &inputs, "\n"));

        assert_eq!(inputs.len(), results.len());
        let results: Vec<Classification> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(1, results[0].quality);
        assert_eq!(22, results[0].scores.n_characters);
        assert_eq!(2, results[1].quality);
        assert_eq!(Reason::Classifier, results[2].reason);
        assert_eq!(22, results[2].scores.n_characters);
        assert_eq!(Reason::Empty, results[3].reason);
        assert_eq!(Reason::Empty, results[4].reason);
    }

    #[test]
    fn test_write_rows() {
        let inputs = vec![
            text_input(Path::new("a.txt")),
            text_input(Path::new("b.txt")),
            text_input(Path::new("c.txt")),
        ];
        let results = vec![
            Ok(classification(1)),
            Err(TextQualityError::InvalidModel("broken".into())),
            Ok(classification(2)),
        ];
        let mut buf = vec![];
        write_rows(&mut buf, &inputs, &results, false).unwrap();
        assert_eq!(
            "filename,quality_class\na.txt,1\nb.txt,\nc.txt,2\n",
            String::from_utf8(buf).unwrap(),
        );
    }

    #[test]
    fn test_write_rows_with_scores() {
        let inputs = vec![text_input(Path::new("a.txt")), text_input(Path::new("b.txt"))];
        let results = vec![
            Ok(classification(1)),
            Err(TextQualityError::InvalidModel("broken".into())),
        ];
        let mut buf = vec![];
        write_rows(&mut buf, &inputs, &results, true).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(3, lines.len());
        let n_fields = lines[0].split(',').count();
        assert_eq!(ClassifierScores::FIELDS.len() + 3, n_fields);
        assert_eq!("reason", lines[0].rsplit(',').next().unwrap());
        assert!(lines[1].starts_with("a.txt,1,0.5,0,0,,0.5,"));
        assert!(lines[1].ends_with(",CLASSIFIER"));
        assert_eq!(format!("b.txt{}", ",".repeat(n_fields - 1)), lines[2]);
    }
}
