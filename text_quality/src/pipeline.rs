use core::fmt;

use log::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::errors::{Result, TextQualityError};
use crate::featurizer::{Feature, Featurizer};
use crate::language::LanguageClassifier;
use crate::model::QualityModel;
use crate::page::Page;

/// Quality class of pages consisting of short columns only.
pub const SHORT_COLUMNS_OUTPUT: i32 = 3;

/// Value of a [`ClassifierScores`] field.
#[derive(Clone, Debug, PartialEq)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
}

impl From<f64> for ScoreValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<usize> for ScoreValue {
    fn from(v: usize) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for ScoreValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ScoreValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Scores and metadata of a classification.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassifierScores {
    /// Probability of the predicted class.
    pub confidence: f64,
    pub n_characters: usize,
    pub n_tokens: usize,
    /// Detected language, empty if no language classifier was used.
    pub language: String,
    pub language_confidence: f64,
    pub dict_score: f64,
    pub dict_score_gt: f64,
    pub n_gram_score: f64,
    pub garbage_score: f64,
}

impl ClassifierScores {
    /// Field names in output order.
    pub const FIELDS: &'static [&'static str] = &[
        "confidence",
        "n_characters",
        "n_tokens",
        "language",
        "language_confidence",
        "dict_score",
        "dict_score_gt",
        "n_gram_score",
        "garbage_score",
    ];

    /// Creates a record with every numeric field set to `default`.
    ///
    /// Integer fields take the truncated value; `language` is empty.
    pub fn filled(default: f64) -> Self {
        Self {
            confidence: default,
            n_characters: default as usize,
            n_tokens: default as usize,
            language: String::new(),
            language_confidence: default,
            dict_score: default,
            dict_score_gt: default,
            n_gram_score: default,
            garbage_score: default,
        }
    }

    /// Creates a record with every field set to `default`, except the given ones.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::UnknownField`] if a name is not in [`Self::FIELDS`], checked before
    /// any value is assigned.
    ///
    /// # Examples
    ///
    /// ```
    /// use text_quality::ClassifierScores;
    ///
    /// let fields = [("confidence", 1.0.into()), ("n_characters", 4usize.into())];
    /// let scores = ClassifierScores::with_defaults(0.0, fields).unwrap();
    /// assert_eq!(1.0, scores.confidence);
    /// assert_eq!(4, scores.n_characters);
    /// assert_eq!(0.0, scores.dict_score);
    /// ```
    pub fn with_defaults<'a, I>(default: f64, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, ScoreValue)>,
    {
        let fields: Vec<_> = fields.into_iter().collect();
        if let Some((field, _)) = fields
            .iter()
            .find(|(f, _)| !Self::FIELDS.iter().any(|name| name == f))
        {
            return Err(TextQualityError::UnknownField {
                field: field.to_string(),
                valid: Self::FIELDS,
            });
        }
        let mut scores = Self::filled(default);
        for (field, value) in fields {
            scores.set(field, value)?;
        }
        Ok(scores)
    }

    /// Sets a field by name.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::UnknownField`] for an unknown name, or
    /// [`TextQualityError::InvalidArgument`] if the value has the wrong kind.
    pub fn set<V>(&mut self, field: &str, value: V) -> Result<()>
    where
        V: Into<ScoreValue>,
    {
        let value = value.into();
        if field == "language" {
            return match value {
                ScoreValue::Text(v) => {
                    self.language = v;
                    Ok(())
                }
                ScoreValue::Number(_) => Err(TextQualityError::invalid_argument(
                    "value",
                    "'language' requires a text value",
                )),
            };
        }
        let ScoreValue::Number(v) = value else {
            return Err(TextQualityError::invalid_argument(
                "value",
                format!("'{field}' requires a numeric value"),
            ));
        };
        match field {
            "confidence" => self.confidence = v,
            "n_characters" => self.n_characters = v as usize,
            "n_tokens" => self.n_tokens = v as usize,
            "language_confidence" => self.language_confidence = v,
            "dict_score" => self.dict_score = v,
            "dict_score_gt" => self.dict_score_gt = v,
            "n_gram_score" => self.n_gram_score = v,
            "garbage_score" => self.garbage_score = v,
            _ => {
                return Err(TextQualityError::UnknownField {
                    field: field.to_string(),
                    valid: Self::FIELDS,
                })
            }
        }
        Ok(())
    }

    fn set_feature(&mut self, feature: Feature, value: f64) {
        match feature {
            Feature::DictScore => self.dict_score = value,
            Feature::DictScoreGt => self.dict_score_gt = value,
            Feature::NGramScore => self.n_gram_score = value,
            Feature::GarbageScore => self.garbage_score = value,
        }
    }
}

/// Why a quality class was assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// Predicted by the classifier.
    Classifier,

    /// The page consists of short columns only.
    ShortColumns,

    /// The text is too short.
    Empty,

    /// The text is not in the default language.
    Language,
}

impl Reason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classifier => "CLASSIFIER",
            Self::ShortColumns => "SHORT_COLUMNS",
            Self::Empty => "EMPTY",
            Self::Language => "LANGUAGE",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`Pipeline::classify_with_scores()`].
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub quality: i32,
    pub scores: ClassifierScores,
    pub reason: Reason,
}

/// Input of a [`Pipeline`].
#[derive(Clone, Copy)]
pub enum ClassifierInput<'a> {
    Text(&'a str),
    Page(&'a dyn Page),
}

impl<'a> From<&'a str> for ClassifierInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a dyn Page> for ClassifierInput<'a> {
    fn from(page: &'a dyn Page) -> Self {
        Self::Page(page)
    }
}

impl<'a, P> From<&'a P> for ClassifierInput<'a>
where
    P: Page,
{
    fn from(page: &'a P) -> Self {
        Self::Page(page)
    }
}

/// Classification pipeline.
///
/// Short-circuits degenerate inputs and passes the rest through the featurizer to the model.
pub struct Pipeline {
    model: Box<dyn QualityModel>,
    featurizer: Featurizer,
    config: PipelineConfig,
    language_classifier: Option<Box<dyn LanguageClassifier>>,
}

impl Pipeline {
    /// Creates a new pipeline.
    ///
    /// # Arguments
    ///
    /// * `model` - A trained classifier.
    /// * `featurizer` - A featurizer computing the inputs of `model`.
    /// * `config` - Policy settings.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::FeatureMismatch`] if the model expects other features, or the same
    /// features in another order.
    pub fn new<M>(model: M, featurizer: Featurizer, config: PipelineConfig) -> Result<Self>
    where
        M: QualityModel + 'static,
    {
        let found = featurizer.features();
        if model.feature_names() != found.as_slice() {
            return Err(TextQualityError::FeatureMismatch {
                expected: model.feature_names().to_vec(),
                found: found.into_iter().map(String::from).collect(),
            });
        }
        Ok(Self {
            model: Box::new(model),
            featurizer,
            config,
            language_classifier: None,
        })
    }

    /// Enables language gating.
    pub fn language_classifier<L>(mut self, classifier: L) -> Self
    where
        L: LanguageClassifier + 'static,
    {
        self.language_classifier = Some(Box::new(classifier));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Gets the names of the features passed to the model.
    pub fn features(&self) -> &[String] {
        self.model.feature_names()
    }

    /// Classifies a text or a page.
    ///
    /// # Errors
    ///
    /// Errors of the model or the language classifier are returned as is.
    pub fn classify<'a, I>(&self, input: I) -> Result<i32>
    where
        I: Into<ClassifierInput<'a>>,
    {
        self.classify_with_scores(input).map(|c| c.quality)
    }

    /// Classifies a text or a page, reporting the scores and the reason of the result.
    ///
    /// # Errors
    ///
    /// Errors of the model or the language classifier are returned as is.
    pub fn classify_with_scores<'a, I>(&self, input: I) -> Result<Classification>
    where
        I: Into<ClassifierInput<'a>>,
    {
        match input.into() {
            ClassifierInput::Text(text) => self.classify_text(text),
            ClassifierInput::Page(page) => {
                let lines = page.lines();
                let width = self.config.short_column_width;
                if lines.iter().all(|l| l.chars().count() < width) {
                    warn!("Page '{}' has short columns.", page.id());
                    let mut scores = ClassifierScores::filled(0.0);
                    scores.confidence = 1.0;
                    scores.n_characters = page.text().chars().count();
                    return Ok(Classification {
                        quality: SHORT_COLUMNS_OUTPUT,
                        scores,
                        reason: Reason::ShortColumns,
                    });
                }
                self.classify_text(&page.text())
            }
        }
    }

    fn classify_text(&self, text: &str) -> Result<Classification> {
        let n_characters = text.chars().count();

        if let Some(output) = self.config.empty_page_output {
            let length = text.trim().chars().count();
            if length < self.config.minimum_page_length {
                debug!("Skipping short text: '{text}' ({length} characters).");
                let mut scores = ClassifierScores::filled(0.0);
                scores.confidence = 1.0;
                scores.n_characters = n_characters;
                return Ok(Classification {
                    quality: output,
                    scores,
                    reason: Reason::Empty,
                });
            }
        }

        let mut language = (String::new(), 0.0);
        if let Some(classifier) = &self.language_classifier {
            language = classifier.classify(text)?;
            if language.0 != self.config.default_language {
                info!(
                    "Language '{}' differs from default language '{}'.",
                    language.0, self.config.default_language,
                );
                if let Some(output) = self.config.empty_page_output {
                    let mut scores = ClassifierScores::filled(0.0);
                    scores.n_characters = n_characters;
                    scores.language = language.0;
                    scores.language_confidence = language.1;
                    return Ok(Classification {
                        quality: output,
                        scores,
                        reason: Reason::Language,
                    });
                }
            }
        }

        let (features, tokens) = self.featurizer.featurize(text);
        let table = features.to_table();
        let quality = self.model.predict(&table)?;
        let confidence = self
            .model
            .predict_proba(&table)?
            .into_iter()
            .fold(0.0, f64::max);

        let mut scores = ClassifierScores {
            confidence,
            n_characters,
            n_tokens: tokens.len(),
            language: language.0,
            language_confidence: language.1,
            ..Default::default()
        };
        for (feature, value) in features.iter() {
            scores.set_feature(feature, value);
        }
        Ok(Classification {
            quality,
            scores,
            reason: Reason::Classifier,
        })
    }
}
