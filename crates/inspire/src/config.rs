//! User configuration.
//!
//! Settings are read from a TOML file, by default `<config_dir>/inspire/config.toml`. Every key
//! is optional and falls back to the built-in default, a missing file means all defaults:
//!
//! ```toml
//! api_url = "https://inspirehep.net/api"
//! size = 10
//! sort = "mostrecent"
//! display = "latex-eu"
//! page_size = 5
//! max_authors = 5
//! bib_file = "~/.local/share/inspire/references.bib"
//! pdf_dir = "~/.local/share/inspire/pdfs"
//! timeout_secs = 20
//! retry_server_errors = false
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, trace};
use serde::Deserialize;

use crate::{display::DisplayMode, query::Sort, Error, ErrorKind};

const APP_DIR: &str = "inspire";

/// Typed and validated configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the INSPIRE REST API.
    pub api_url: String,
    /// Number of records to retrieve per search.
    pub size: u32,
    /// Sort order of the records.
    #[serde(with = "from_str")]
    pub sort: Sort,
    /// Display mode used by a bare `--display` flag.
    #[serde(with = "from_str")]
    pub display: DisplayMode,
    /// Number of records shown per page in the selector.
    pub page_size: usize,
    /// Number of authors shown before `et al.`.
    pub max_authors: usize,
    /// Bibliography file used by a bare `--bib` flag.
    pub bib_file: PathBuf,
    /// Directory where downloaded PDFs are saved.
    pub pdf_dir: PathBuf,
    /// Timeout of a single HTTP request in seconds.
    pub timeout_secs: u64,
    /// Retry once, after a short pause, when the service answers with a 5xx status.
    pub retry_server_errors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            api_url: "https://inspirehep.net/api".to_owned(),
            size: 10,
            sort: Sort::MostRecent,
            display: DisplayMode::LatexEu,
            page_size: 5,
            max_authors: 5,
            bib_file: data_dir.join("references.bib"),
            pdf_dir: data_dir.join("pdfs"),
            timeout_secs: 20,
            retry_server_errors: false,
        }
    }
}

impl Settings {
    /// The platform configuration file: `<config_dir>/inspire/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Loads the settings from `path`, or from [`Settings::default_path`] when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] when the file exists but cannot be read, is not valid TOML,
    /// or holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) => {
                debug!("No configuration at '{}' - using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> Result<Self, Error> {
        trace!("Reading configuration from '{}'", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::wrap_with(
                ErrorKind::Config,
                e,
                format!("Cannot read the '{}' configuration file", path.display()),
            )
        })?;

        Self::parse(&content)
    }

    /// Parses and validates settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] when the string is not valid TOML or holds an invalid value.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| Error::wrap_with(ErrorKind::Config, e, "Invalid configuration"))?;
        settings.validate()
    }

    fn validate(self) -> Result<Self, Error> {
        let positive = [
            ("size", self.size > 0),
            ("page_size", self.page_size > 0),
            ("max_authors", self.max_authors > 0),
            ("timeout_secs", self.timeout_secs > 0),
        ];

        if let Some((name, _)) = positive.iter().find(|(_, ok)| !ok) {
            return Err(Error::new(
                ErrorKind::Config,
                format!("'{name}' must be a positive number"),
            ));
        }

        Ok(self)
    }

    /// The request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Deserializes a value through its `FromStr` implementation.
mod from_str {
    use std::{fmt::Display, str::FromStr};

    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::{fixture::FileWriteStr, NamedTempFile};

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::default(), Settings::parse("").unwrap());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let settings = Settings::parse(
            r#"
            size = 25
            sort = "mostcited"
            display = "bibtex"
            bib_file = "/tmp/refs.bib"
            "#,
        )
        .unwrap();

        assert_eq!(25, settings.size);
        assert_eq!(Sort::MostCited, settings.sort);
        assert_eq!(DisplayMode::Bibtex, settings.display);
        assert_eq!(PathBuf::from("/tmp/refs.bib"), settings.bib_file);
        assert_eq!(Settings::default().page_size, settings.page_size);
    }

    #[test]
    fn zero_size_is_rejected() {
        let err = Settings::parse("size = 0").unwrap_err();

        assert_eq!(ErrorKind::Config, err.kind());
        assert!(err.to_string().contains("'size'"));
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let err = Settings::parse(r#"sort = "oldest""#).unwrap_err();
        assert_eq!(ErrorKind::Config, err.kind());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = Settings::parse("sizes = 3").unwrap_err();
        assert_eq!(ErrorKind::Config, err.kind());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = Settings::load(Some(Path::new("no such config.toml"))).unwrap();
        assert_eq!(Settings::default(), settings);
    }

    #[test]
    fn load_reads_the_given_file() {
        let file = NamedTempFile::new("config.toml").unwrap();
        file.write_str("max_authors = 2\ntimeout_secs = 3\n").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        file.close().unwrap();

        assert_eq!(2, settings.max_authors);
        assert_eq!(Duration::from_secs(3), settings.timeout());
    }
}
