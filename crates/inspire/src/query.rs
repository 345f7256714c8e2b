//! Building literature search requests from the user's terms and options.

use std::{fmt, str::FromStr};

use crate::{config::Settings, Error, ErrorKind};

/// The sort orders supported by the literature search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sort {
    /// Newest records first.
    MostRecent,
    /// Most cited records first.
    MostCited,
}

impl Sort {
    /// The name the service uses for the sort order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MostRecent => "mostrecent",
            Self::MostCited => "mostcited",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mostrecent" => Ok(Self::MostRecent),
            "mostcited" => Ok(Self::MostCited),
            other => Err(Error::new(
                ErrorKind::InvalidOption,
                format!("unknown sort order '{other}' (expected 'mostrecent' or 'mostcited')"),
            )),
        }
    }
}

/// A validated literature search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    text: String,
    size: u32,
    sort: Sort,
}

impl Query {
    /// Starts building a query for the free text `text`, taking defaults from `settings`.
    #[must_use]
    pub fn builder<'a>(text: &str, settings: &'a Settings) -> QueryBuilder<'a> {
        QueryBuilder {
            text: text.to_owned(),
            size: None,
            sort: None,
            settings,
        }
    }

    /// The query that looks up a single record by its citation key.
    #[must_use]
    pub fn for_key(key: &str) -> Self {
        Self {
            text: format!("texkeys:{key}"),
            size: 1,
            sort: Sort::MostRecent,
        }
    }

    /// The search text as sent to the service.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The number of records to retrieve, always positive.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// The order the service sorts records in.
    #[must_use]
    pub const fn sort(&self) -> Sort {
        self.sort
    }

    /// Describes the request for this query against the API at `api_url`.
    #[must_use]
    pub fn request(&self, api_url: &str) -> Request {
        Request {
            endpoint: format!("{}/literature", api_url.trim_end_matches('/')),
            params: vec![
                ("sort", self.sort.as_str().to_owned()),
                ("size", self.size.to_string()),
                ("q", self.text.clone()),
            ],
        }
    }
}

/// Builder for [`Query`], see [`Query::builder`].
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    text: String,
    size: Option<i64>,
    sort: Option<String>,
    settings: &'a Settings,
}

impl QueryBuilder<'_> {
    /// The number of records to retrieve, when `None` the configured default is used.
    #[must_use]
    pub const fn size(mut self, size: Option<i64>) -> Self {
        self.size = size;
        self
    }

    /// The name of the sort order, when `None` the configured default is used.
    #[must_use]
    pub fn sort(mut self, sort: Option<&str>) -> Self {
        self.sort = sort.map(str::to_owned);
        self
    }

    /// Validates the options and builds the [`Query`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidOption`] when the text is blank, the size is not a positive
    /// number or the sort order is unknown.
    pub fn build(self) -> Result<Query, Error> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidOption,
                "a search query is required (or use --update)",
            ));
        }

        let size = match self.size {
            None => self.settings.size,
            Some(size) => u32::try_from(size).ok().filter(|s| *s > 0).ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidOption,
                    format!("size must be a positive number, got {size}"),
                )
            })?,
        };

        let sort = match self.sort {
            None => self.settings.sort,
            Some(sort) => sort.parse()?,
        };

        Ok(Query {
            text: text.to_owned(),
            size,
            sort,
        })
    }
}

/// The endpoint and query parameters of a search request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// The full URL of the endpoint, without a query string.
    pub endpoint: String,
    /// Query parameters in the order they are sent.
    pub params: Vec<(&'static str, String)>,
}

impl Request {
    /// The full URL with percent encoded parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidOption`] when the endpoint is not a valid URL.
    pub fn url(&self) -> Result<reqwest::Url, Error> {
        reqwest::Url::parse_with_params(&self.endpoint, &self.params).map_err(|e| {
            Error::wrap_with(
                ErrorKind::InvalidOption,
                e,
                format!("'{}' is not a valid API url", self.endpoint),
            )
        })
    }
}
