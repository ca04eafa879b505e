use std::path::{Path, PathBuf};

use crate::errors::{Result, TextQualityError};

/// Policy settings of a [`Pipeline`](crate::Pipeline).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Texts with fewer characters, after trimming whitespace, are considered empty.
    pub minimum_page_length: usize,

    /// Class assigned to empty pages and pages in another language.
    ///
    /// `None` disables both shortcuts; such inputs are passed to the classifier.
    pub empty_page_output: Option<i32>,

    /// Pages whose lines are all shorter than this are considered columns of short text.
    pub short_column_width: usize,

    /// Language the classifier was trained for.
    pub default_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            minimum_page_length: 5,
            empty_page_output: Some(0),
            short_column_width: 5,
            default_language: "nl".to_string(),
        }
    }
}

/// Locations of the resource files the scorers and the classifier are built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePaths {
    /// Directory containing `<hunspell_language>.aff` and `<hunspell_language>.dic`.
    pub hunspell_dir: PathBuf,
    pub hunspell_language: String,
    pub token_dict_file: PathBuf,
    pub qgrams_file: PathBuf,
    pub model_file: PathBuf,
}

impl ResourcePaths {
    /// Lays out the resources of a language under a data directory:
    ///
    /// ```text
    /// <dir>/dicts/hunspell/<hunspell_language>.{aff,dic}
    /// <dir>/dicts/<language>_voc.txt
    /// <dir>/qgrams/<language>_voc.txt
    /// <dir>/classifier/model.bin.zst
    /// ```
    ///
    /// # Arguments
    ///
    /// * `dir` - Data directory.
    /// * `language` - Language code, e.g. `nl`.
    /// * `hunspell_language` - Name of the Hunspell dictionary, e.g. `nl_NL`.
    pub fn from_data_dir<P, S, T>(dir: P, language: S, hunspell_language: T) -> Self
    where
        P: AsRef<Path>,
        S: AsRef<str>,
        T: Into<String>,
    {
        let dir = dir.as_ref();
        let language = language.as_ref();
        Self {
            hunspell_dir: dir.join("dicts").join("hunspell"),
            hunspell_language: hunspell_language.into(),
            token_dict_file: dir.join("dicts").join(format!("{language}_voc.txt")),
            qgrams_file: dir.join("qgrams").join(format!("{language}_voc.txt")),
            model_file: dir.join("classifier").join("model.bin.zst"),
        }
    }

    /// Gets the paths of the Hunspell affix and dictionary files.
    pub fn hunspell_files(&self) -> (PathBuf, PathBuf) {
        (
            self.hunspell_dir
                .join(format!("{}.aff", self.hunspell_language)),
            self.hunspell_dir
                .join(format!("{}.dic", self.hunspell_language)),
        )
    }

    /// Checks that every resource exists.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::MissingResource`] with the first missing path.
    pub fn validate(&self) -> Result<()> {
        let (aff, dic) = self.hunspell_files();
        for path in [
            &aff,
            &dic,
            &self.token_dict_file,
            &self.qgrams_file,
            &self.model_file,
        ] {
            if !path.is_file() {
                return Err(TextQualityError::MissingResource(path.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(5, config.minimum_page_length);
        assert_eq!(Some(0), config.empty_page_output);
        assert_eq!(5, config.short_column_width);
        assert_eq!("nl", config.default_language);
    }

    #[test]
    fn test_from_data_dir() {
        let paths = ResourcePaths::from_data_dir("/data", "nl", "nl_NL");
        assert_eq!(Path::new("/data/dicts/hunspell"), paths.hunspell_dir);
        assert_eq!(Path::new("/data/dicts/nl_voc.txt"), paths.token_dict_file);
        assert_eq!(Path::new("/data/qgrams/nl_voc.txt"), paths.qgrams_file);
        assert_eq!(Path::new("/data/classifier/model.bin.zst"), paths.model_file);
        assert_eq!(
            (
                PathBuf::from("/data/dicts/hunspell/nl_NL.aff"),
                PathBuf::from("/data/dicts/hunspell/nl_NL.dic")
            ),
            paths.hunspell_files()
        );
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ResourcePaths::from_data_dir(dir.path(), "nl", "nl_NL");
        match paths.validate() {
            Err(TextQualityError::MissingResource(path)) => {
                assert_eq!(paths.hunspell_files().0, path)
            }
            r => panic!("unexpected result: {r:?}"),
        }

        fs::create_dir_all(&paths.hunspell_dir).unwrap();
        fs::create_dir_all(dir.path().join("qgrams")).unwrap();
        fs::create_dir_all(dir.path().join("classifier")).unwrap();
        let (aff, dic) = paths.hunspell_files();
        for path in [&aff, &dic, &paths.token_dict_file, &paths.qgrams_file] {
            fs::write(path, "").unwrap();
        }
        match paths.validate() {
            Err(TextQualityError::MissingResource(path)) => assert_eq!(paths.model_file, path),
            r => panic!("unexpected result: {r:?}"),
        }

        fs::write(&paths.model_file, "").unwrap();
        paths.validate().unwrap();
    }
}
