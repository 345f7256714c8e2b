pub(crate) type DynError = Box<dyn std::error::Error + Send + Sync>;

/// The Errors that may occur when calling the inspire functions.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<DynError>,
}

/// Types of errors that make up an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An option given by the user (or configuration) is not valid.
    ///
    /// These are always raised before any network or file I/O takes place.
    InvalidOption,
    /// The configuration file exists but cannot be read or understood.
    Config,
    /// The request could not be completed: connection failure or timeout.
    Network,
    /// The service answered with a non-success status.
    Api,
    /// The service response was not the expected JSON.
    Parse,
    /// An existing bibliography file cannot be parsed.
    StoreParse,
    /// The bibliography file could not be written.
    StoreWrite,
    /// The error is associated with an underlying IO error.
    Io,
}

impl Error {
    /// Creates a new [`Error`] based on the [`ErrorKind`] and message to describe the error.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Wraps an existing error as the source of [`Error`].
    pub fn wrap<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<DynError>,
    {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Wraps an existing error as the source of [`Error`] with a message that describes what was
    /// being attempted.
    pub fn wrap_with<E, S>(kind: ErrorKind, source: E, message: S) -> Self
    where
        E: Into<DynError>,
        S: Into<String>,
    {
        Self {
            kind,
            message: Some(message.into()),
            source: Some(source.into()),
        }
    }

    /// Returns the kind of error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message of the error, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ErrorKind::InvalidOption => f.write_str("Invalid option")?,
            ErrorKind::Config => f.write_str("Configuration error")?,
            ErrorKind::Network => f.write_str("Network error")?,
            ErrorKind::Api => f.write_str("API error")?,
            ErrorKind::Parse => f.write_str("Parse error")?,
            ErrorKind::StoreParse => f.write_str("Bibliography parse error")?,
            ErrorKind::StoreWrite => f.write_str("Bibliography write error")?,
            ErrorKind::Io => f.write_str("IO error")?,
        };

        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }

        if let Some(cause) = &self.source {
            write!(f, ": caused by {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}
