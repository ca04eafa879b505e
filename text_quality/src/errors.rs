//! Definition of errors.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = TextQualityError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TextQualityError {
    /// The features expected by the classifier differ from the ones computed by the featurizer.
    #[error("FeatureMismatchError: classifier expects {expected:?}, featurizer provides {found:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A required resource file or directory does not exist.
    #[error("MissingResourceError: {0:?}")]
    MissingResource(PathBuf),

    /// A resource exists but could not be interpreted.
    #[error("InvalidResourceError: {0}")]
    InvalidResource(String),

    /// The classifier model is inconsistent.
    #[error("InvalidModelError: {0}")]
    InvalidModel(String),

    #[error("InvalidArgumentError: {arg}: {msg}")]
    InvalidArgument { arg: &'static str, msg: String },

    /// A scores record was addressed with a field name outside its schema.
    #[error("UnknownFieldError: unknown field '{field}', valid fields are {valid:?}")]
    UnknownField {
        field: String,
        valid: &'static [&'static str],
    },

    /// Refused to overwrite an existing file.
    #[error("ResourceExistsError: {0:?}")]
    ResourceExists(PathBuf),

    /// A model file is missing and no download location is known for it.
    #[error("UnknownModelLocationError: no download location known for {0:?}")]
    UnknownModelLocation(PathBuf),

    /// A model file is missing and downloading it failed.
    #[error("DownloadError: {url}: {msg}")]
    Download { url: String, msg: String },

    /// A model file is missing and downloading is disabled.
    #[error("ModelNotFoundError: {0:?}")]
    ModelNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Decode(#[from] bincode::error::DecodeError),

    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),
}

impl TextQualityError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(msg.into())
    }

    pub(crate) fn invalid_resource<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidResource(msg.into())
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument {
            arg,
            msg: msg.into(),
        }
    }
}
