use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, TextQualityError};
use crate::featurizer::FeatureTable;

/// Trait of pretrained quality classifiers.
pub trait QualityModel: Send + Sync {
    /// Gets the names of the input columns, in the order the model was trained with.
    fn feature_names(&self) -> &[String];

    /// Predicts the quality class of a single-row table.
    fn predict(&self, features: &FeatureTable) -> Result<i32>;

    /// Predicts the probability of each class of a single-row table.
    fn predict_proba(&self, features: &FeatureTable) -> Result<Vec<f64>>;
}

/// Multinomial logistic regression model.
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct LinearModel {
    classes: Vec<i32>,
    feature_names: Vec<String>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl LinearModel {
    /// Creates a new model.
    ///
    /// # Arguments
    ///
    /// * `classes` - Class labels.
    /// * `feature_names` - Names of the input columns.
    /// * `weights` - Weights of each class, one per input column.
    /// * `bias` - Bias of each class.
    ///
    /// # Errors
    ///
    /// If the shapes of the arguments are inconsistent, an error variant will be returned.
    pub fn new(
        classes: Vec<i32>,
        feature_names: Vec<String>,
        weights: Vec<Vec<f64>>,
        bias: Vec<f64>,
    ) -> Result<Self> {
        if classes.is_empty() {
            return Err(TextQualityError::invalid_model("no classes"));
        }
        if weights.len() != classes.len() || bias.len() != classes.len() {
            return Err(TextQualityError::invalid_model(format!(
                "{} classes, but {} weight vectors and {} biases",
                classes.len(),
                weights.len(),
                bias.len(),
            )));
        }
        if let Some(w) = weights.iter().find(|w| w.len() != feature_names.len()) {
            return Err(TextQualityError::invalid_model(format!(
                "{} features, but a weight vector of length {}",
                feature_names.len(),
                w.len(),
            )));
        }
        Ok(Self {
            classes,
            feature_names,
            weights,
            bias,
        })
    }

    /// Exports the model data.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<usize>
    where
        W: Write,
    {
        Ok(bincode::encode_into_std_write(
            self,
            wtr,
            bincode::config::standard(),
        )?)
    }

    /// Creates a model from a reader.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error or the data is inconsistent, it will be returned.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let model: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        Self::new(model.classes, model.feature_names, model.weights, model.bias)
    }

    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    fn inputs(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        self.feature_names
            .iter()
            .map(|name| {
                features.get(name).ok_or_else(|| {
                    TextQualityError::invalid_argument(
                        "features",
                        format!("missing column '{name}'"),
                    )
                })
            })
            .collect()
    }
}

impl QualityModel for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureTable) -> Result<i32> {
        let proba = self.predict_proba(features)?;
        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }
        Ok(self.classes[best])
    }

    fn predict_proba(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        let xs = self.inputs(features)?;
        let scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(ws, b)| ws.iter().zip(&xs).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}
