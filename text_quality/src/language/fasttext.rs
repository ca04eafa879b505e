use std::fs;
use std::path::{Path, PathBuf};

use fasttext::FastText;
use log::info;

use crate::errors::{Result, TextQualityError};
use crate::language::{aggregate_lines, preprocess, LanguageClassifier};

const LABEL_PREFIX: &str = "__label__";

/// Known download locations of fastText language identification models.
pub const MODEL_URLS: &[(&str, &str)] = &[
    (
        "lid.176.ftz",
        "https://dl.fbaipublicfiles.com/fasttext/supervised-models/lid.176.ftz",
    ),
    (
        "lid.176.bin",
        "https://dl.fbaipublicfiles.com/fasttext/supervised-models/lid.176.bin",
    ),
];

/// Language classifier using a fastText language identification model.
///
/// Each line of the input is classified separately and the results are combined with
/// [`aggregate_lines()`].
pub struct FastTextLanguageClassifier {
    model: FastText,
    threshold: f32,
}

impl FastTextLanguageClassifier {
    /// Default confidence threshold for line predictions.
    pub const DEFAULT_THRESHOLD: f32 = 0.5;

    /// Gets the default model location, `lid.176.ftz` in the temporary directory.
    pub fn default_model_file() -> PathBuf {
        std::env::temp_dir().join("lid.176.ftz")
    }

    /// Loads a model, downloading it first if necessary.
    ///
    /// # Arguments
    ///
    /// * `model_file` - Local path of the model.
    /// * `download` - Whether to download the model if `model_file` does not exist. The file
    ///   name must be one of [`MODEL_URLS`].
    /// * `threshold` - Line predictions below this confidence are discarded.
    ///
    /// # Errors
    ///
    /// - [`TextQualityError::ModelNotFound`] if the file is missing and `download` is false.
    /// - [`TextQualityError::UnknownModelLocation`] if the file is missing and its name has no
    ///   known download location.
    /// - [`TextQualityError::Download`] if the download fails.
    /// - [`TextQualityError::InvalidModel`] if fastText cannot load the file.
    pub fn new<P>(model_file: P, download: bool, threshold: f32) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let model_file = model_file.as_ref();
        if !model_file.is_file() {
            if !download {
                return Err(TextQualityError::ModelNotFound(model_file.to_path_buf()));
            }
            download_model(model_file)?;
        }
        info!("Reading language model from file {model_file:?}.");
        let path = model_file
            .to_str()
            .ok_or_else(|| TextQualityError::invalid_argument("model_file", "not valid UTF-8"))?;
        let mut model = FastText::new();
        model.load_model(path).map_err(TextQualityError::invalid_model)?;
        Ok(Self { model, threshold })
    }
}

fn download_model(target: &Path) -> Result<()> {
    let name = target
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let url = MODEL_URLS
        .iter()
        .find(|(model, _)| *model == name)
        .map(|(_, url)| *url)
        .ok_or_else(|| TextQualityError::UnknownModelLocation(target.to_path_buf()))?;
    let download_error = |e: reqwest::Error| TextQualityError::Download {
        url: url.to_string(),
        msg: e.to_string(),
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    info!("Downloading from {url:?}, storing at {target:?}.");
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_error)?;
    let mut f = fs::File::create(target)?;
    if let Err(e) = response.copy_to(&mut f) {
        drop(f);
        fs::remove_file(target)?;
        return Err(download_error(e));
    }
    Ok(())
}

impl LanguageClassifier for FastTextLanguageClassifier {
    fn classify(&self, text: &str) -> Result<(String, f64)> {
        let mut predictions = vec![];
        for line in text.split('\n') {
            let line = preprocess(line);
            let prediction = self
                .model
                .predict(&line, 1, self.threshold)
                .map_err(TextQualityError::invalid_model)?;
            predictions.push(
                prediction
                    .into_iter()
                    .map(|p| {
                        let label = p.label.strip_prefix(LABEL_PREFIX).unwrap_or(&p.label);
                        (label.to_string(), f64::from(p.prob))
                    })
                    .collect::<Vec<_>>(),
            );
        }
        Ok(aggregate_lines(&predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FastTextLanguageClassifier>();
    }

    #[test]
    fn test_default_model_file() {
        let path = FastTextLanguageClassifier::default_model_file();
        assert_eq!(Some(std::ffi::OsStr::new("lid.176.ftz")), path.file_name());
        assert!(MODEL_URLS.iter().any(|(name, _)| *name == "lid.176.ftz"));
    }

    #[test]
    fn test_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lid.176.ftz");
        let result = FastTextLanguageClassifier::new(&path, false, 0.5);
        assert!(matches!(result, Err(TextQualityError::ModelNotFound(_))));
    }

    #[test]
    fn test_unknown_model_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unknown.bin");
        let result = FastTextLanguageClassifier::new(&path, true, 0.5);
        assert!(matches!(
            result,
            Err(TextQualityError::UnknownModelLocation(_))
        ));
        assert!(!path.exists());
    }
}
