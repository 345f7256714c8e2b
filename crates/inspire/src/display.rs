//! Rendering records for the terminal.

use std::{fmt, str::FromStr};

use crate::{
    format::{BibTex, Format},
    record::Record,
    Error, ErrorKind,
};

/// How records are shown when they are not merged into a bibliography.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// One line per record.
    Short,
    /// A block per record with every known attribute.
    Verbose,
    /// `BibTeX` entries composed locally.
    Bibtex,
    /// The service's `LaTeX` (EU) rendering.
    LatexEu,
    /// The service's `LaTeX` (US) rendering.
    LatexUs,
    /// The service's JSON record.
    Json,
    /// The service's CV (HTML) rendering.
    Cv,
    /// The records citing this one, as JSON.
    Citations,
}

impl DisplayMode {
    /// Every mode, in the order they are listed to the user.
    pub const ALL: [Self; 8] = [
        Self::Short,
        Self::Verbose,
        Self::Bibtex,
        Self::LatexEu,
        Self::LatexUs,
        Self::Json,
        Self::Cv,
        Self::Citations,
    ];

    /// The name of the mode on the command line and in the configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Verbose => "verbose",
            Self::Bibtex => "bibtex",
            Self::LatexEu => "latex-eu",
            Self::LatexUs => "latex-us",
            Self::Json => "json",
            Self::Cv => "cv",
            Self::Citations => "citations",
        }
    }

    /// The name of the record link serving this rendering, `None` for modes rendered locally.
    #[must_use]
    pub const fn link_name(self) -> Option<&'static str> {
        match self {
            Self::Short | Self::Verbose | Self::Bibtex => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let names = Self::ALL.map(Self::as_str).join(", ");
                Error::new(
                    ErrorKind::InvalidOption,
                    format!("unknown display mode '{s}' (expected one of {names})"),
                )
            })
    }
}

/// Renders `records` in API order for the locally rendered modes.
///
/// Returns `None` for modes served by a record link, see [`DisplayMode::link_name`].
#[must_use]
pub fn render(records: &[Record], mode: DisplayMode) -> Option<String> {
    let rendered = match mode {
        DisplayMode::Short => records.iter().map(short).collect::<Vec<_>>().join("\n"),
        DisplayMode::Verbose => records.iter().map(verbose).collect::<Vec<_>>().join("\n"),
        DisplayMode::Bibtex => records
            .iter()
            .map(BibTex::compose_entry)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };

    Some(rendered)
}

fn short(record: &Record) -> String {
    let author = match record.authors.first() {
        Some(first) if record.author_count > 1 => format!("{first} et al."),
        Some(first) => first.clone(),
        None => String::from("-"),
    };

    format!(
        "{}  {author}  ({})  {}",
        record.key,
        record.year.as_deref().unwrap_or("n.d."),
        record.title
    )
}

fn verbose(record: &Record) -> String {
    let mut lines = vec![
        format!("{} [{}]", record.key, record.kind),
        format!("  title:   {}", record.title),
    ];

    if !record.authors.is_empty() {
        let mut authors = record.authors.join("; ");
        if record.author_count > record.authors.len() {
            authors.push_str(&format!(" ({} in total)", record.author_count));
        }
        lines.push(format!("  authors: {authors}"));
    }
    if let Some(venue) = &record.venue {
        lines.push(format!("  venue:   {venue}"));
    }
    if let Some(date) = record.date.as_ref().or(record.year.as_ref()) {
        lines.push(format!("  date:    {date}"));
    }
    if let Some(eprint) = &record.eprint {
        lines.push(format!("  arXiv:   {}", eprint.id));
    }
    if let Some(doi) = record.field("doi") {
        lines.push(format!("  doi:     {doi}"));
    }
    if !record.alt_keys.is_empty() {
        lines.push(format!("  aka:     {}", record.alt_keys.join(", ")));
    }

    lines.join("\n") + "\n"
}

/// The selector label of `record`:
///
/// ```text
/// ATLAS:2012yve, Aad:2012tfa (2012-07-31)
/// Georges Aad, Tatevik Abajyan et al.
/// "Observation of a new particle"
/// ```
///
/// At most `max_authors` authors are listed, followed by `et al.` when there are more.
#[must_use]
pub fn label(record: &Record, max_authors: usize) -> String {
    let mut keys = record.key.clone();
    for alt in &record.alt_keys {
        keys.push_str(", ");
        keys.push_str(alt);
    }
    if let Some(date) = &record.date {
        keys.push_str(&format!(" ({date})"));
    }

    let mut authors = record
        .authors
        .iter()
        .take(max_authors)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if record.author_count > max_authors {
        authors.push_str(" et al.");
    }

    format!("{keys}\n{authors}\n\"{}\"", record.title)
}
