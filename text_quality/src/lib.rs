#![cfg_attr(docsrs, feature(doc_cfg))]

//! # text_quality
//!
//! Quality classification of digitized (OCR'd) text.
//!
//! A [`Featurizer`] tokenizes a text and computes four scores: dictionary coverage against a
//! morphological and a closed vocabulary, character trigram frequency, and the ratio of garbage
//! tokens. A [`Pipeline`] feeds them to a trained [`QualityModel`] after handling empty pages,
//! pages of short columns, and (optionally) texts in another language.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//!
//! use text_quality::scorer::{GarbageScorer, HunspellDictionary, QGramScorer, TokenDictionary};
//! use text_quality::{Featurizer, LinearModel, Pipeline, PipelineConfig, ResourcePaths, Scorers};
//!
//! let paths = ResourcePaths::from_data_dir("data", "nl", "nl_NL");
//! paths.validate().unwrap();
//!
//! let featurizer = Featurizer::new(Scorers {
//!     dict_score: HunspellDictionary::from_path(&paths.hunspell_dir, &paths.hunspell_language)
//!         .unwrap()
//!         .into(),
//!     dict_score_gt: TokenDictionary::from_file(&paths.token_dict_file).unwrap().into(),
//!     n_gram_score: QGramScorer::from_file(&paths.qgrams_file, QGramScorer::DEFAULT_GAMMA).unwrap(),
//!     garbage_score: GarbageScorer,
//! });
//!
//! let mut f = zstd::Decoder::new(File::open(&paths.model_file).unwrap()).unwrap();
//! let model = LinearModel::read(&mut f).unwrap();
//! let pipeline = Pipeline::new(model, featurizer, PipelineConfig::default()).unwrap();
//!
//! let result = pipeline.classify_with_scores("een Nederlandse tekst").unwrap();
//! println!("{} {}", result.quality, result.reason);
//! ```
//!
//! Language identification with fastText requires **crate feature** `fasttext`. For more
//! details, see `FastTextLanguageClassifier`.

mod config;
mod errors;
mod featurizer;
mod model;
mod page;
mod pipeline;

pub mod language;
pub mod scorer;
pub mod tokenizer;

pub use config::{PipelineConfig, ResourcePaths};
pub use errors::{Result, TextQualityError};
pub use featurizer::{Feature, FeatureTable, Features, Featurizer, Scorers};
pub use language::LanguageClassifier;
pub use model::{LinearModel, QualityModel};
pub use page::{Page, PageXml};
pub use pipeline::{
    Classification, ClassifierInput, ClassifierScores, Pipeline, Reason, ScoreValue,
    SHORT_COLUMNS_OUTPUT,
};
pub use scorer::Scorer;
pub use tokenizer::{OcrTokenizer, Tokenizer};

#[cfg(feature = "fasttext")]
pub use language::FastTextLanguageClassifier;
