use core::fmt;

use crate::scorer::{DictionaryScorer, GarbageScorer, QGramScorer, Scorer};
use crate::tokenizer::{OcrTokenizer, Tokenizer};

/// Feature computed by one of the scorers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Coverage of the morphological dictionary.
    DictScore,

    /// Coverage of the closed vocabulary.
    DictScoreGt,

    /// Character trigram score.
    NGramScore,

    /// Ratio of garbage tokens.
    GarbageScore,
}

impl Feature {
    /// All features in column order.
    pub const ALL: [Self; 4] = [
        Self::DictScore,
        Self::DictScoreGt,
        Self::NGramScore,
        Self::GarbageScore,
    ];

    /// Gets the column name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DictScore => "dict_score",
            Self::DictScoreGt => "dict_score_gt",
            Self::NGramScore => "n_gram_score",
            Self::GarbageScore => "garbage_score",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scorers assigned to each feature.
pub struct Scorers {
    pub dict_score: DictionaryScorer,
    pub dict_score_gt: DictionaryScorer,
    pub n_gram_score: QGramScorer,
    pub garbage_score: GarbageScorer,
}

impl Scorers {
    fn get(&self, feature: Feature) -> &dyn Scorer {
        match feature {
            Feature::DictScore => &self.dict_score,
            Feature::DictScoreGt => &self.dict_score_gt,
            Feature::NGramScore => &self.n_gram_score,
            Feature::GarbageScore => &self.garbage_score,
        }
    }
}

/// Feature values of one input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Features {
    values: [f64; Feature::ALL.len()],
}

impl Features {
    pub const fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Iterates over features in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    /// Converts the values into a single-row table.
    pub fn to_table(&self) -> FeatureTable {
        FeatureTable {
            columns: Feature::ALL.iter().map(|f| f.name().to_string()).collect(),
            values: self.values.to_vec(),
        }
    }
}

/// Single-row table of named feature values, the input format of a
/// [`QualityModel`](crate::QualityModel).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureTable {
    /// Creates a table from `(column, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (columns, values) = pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Gets the value of a column.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }
}

/// Computes all features of a text from a single tokenization.
pub struct Featurizer {
    scorers: Scorers,
    tokenizer: Box<dyn Tokenizer + Send + Sync>,
}

impl Featurizer {
    /// Creates a featurizer using [`OcrTokenizer`].
    pub fn new(scorers: Scorers) -> Self {
        Self {
            scorers,
            tokenizer: Box::new(OcrTokenizer),
        }
    }

    /// Replaces the tokenizer.
    pub fn tokenizer<T>(mut self, tokenizer: T) -> Self
    where
        T: Tokenizer + Send + Sync + 'static,
    {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Gets the names of the computed features in column order.
    pub fn features(&self) -> Vec<&'static str> {
        Feature::ALL.iter().map(|f| f.name()).collect()
    }

    /// Computes the features of a text.
    ///
    /// # Returns
    ///
    /// The features and the tokens they were computed from.
    pub fn featurize(&self, text: &str) -> (Features, Vec<String>) {
        let tokens = self.tokenizer.tokenize(text);
        let mut features = Features::default();
        for feature in Feature::ALL {
            features.values[feature.index()] = self.scorers.get(feature).score(&tokens);
        }
        (features, tokens)
    }

    /// Computes the features of a text as a single-row table.
    pub fn featurize_as_table(&self, text: &str) -> (FeatureTable, Vec<String>) {
        let (features, tokens) = self.featurize(text);
        (features.to_table(), tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::scorer::TokenDictionary;

    fn featurizer() -> Featurizer {
        Featurizer::new(Scorers {
            dict_score: TokenDictionary::from_tokens(["test", "token", "een", "tekst"]).into(),
            dict_score_gt: TokenDictionary::from_tokens(["een"]).into(),
            n_gram_score: QGramScorer::new(vec!["tes".into(), "tok".into()]),
            garbage_score: GarbageScorer,
        })
    }

    #[test]
    fn test_features() {
        assert_eq!(
            vec!["dict_score", "dict_score_gt", "n_gram_score", "garbage_score"],
            featurizer().features()
        );
    }

    #[test]
    fn test_featurize_empty() {
        let (features, tokens) = featurizer().featurize("");
        assert_eq!(Features::default(), features);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_featurize() {
        let (features, tokens) = featurizer().featurize("test token");
        assert_eq!(vec!["test", "token"], tokens);
        assert_eq!(1.0, features.get(Feature::DictScore));
        assert_eq!(0.0, features.get(Feature::DictScoreGt));
        // tes est tok oke ken
        assert!((features.get(Feature::NGramScore) - 1.5 / 5.0).abs() < 1e-9);
        assert_eq!(0.0, features.get(Feature::GarbageScore));
    }

    #[test]
    fn test_featurize_as_table() {
        let (table, tokens) = featurizer().featurize_as_table("een tekst");
        assert_eq!(vec!["een", "tekst"], tokens);
        assert_eq!(
            &["dict_score", "dict_score_gt", "n_gram_score", "garbage_score"],
            table.columns()
        );
        assert_eq!(Some(1.0), table.get("dict_score"));
        assert_eq!(Some(3.0 / 8.0), table.get("dict_score_gt"));
        assert_eq!(None, table.get("unknown"));
    }

    #[test]
    fn test_features_iter() {
        let (features, _) = featurizer().featurize("test");
        let names: Vec<_> = features.iter().map(|(f, _)| f.to_string()).collect();
        assert_eq!(featurizer().features(), names);
    }
}
