//! The bibliographic record shared by the API client, the formatters and the bibliography store.

use std::{borrow::Cow, collections::BTreeMap, fmt, str::FromStr};

/// The kind of a bibliographic entry, named after its `BibTeX` entry type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// `@article`
    Article,
    /// `@book`
    Book,
    /// `@incollection`
    InCollection,
    /// `@inproceedings`, also read from `@conference`.
    InProceedings,
    /// `@mastersthesis`
    MastersThesis,
    /// `@misc`
    Misc,
    /// `@phdthesis`
    PhdThesis,
    /// `@proceedings`
    Proceedings,
    /// `@techreport`, also read from `@report`.
    TechReport,
    /// Any other entry type, stored lowercase.
    Other(Cow<'static, str>),
}

impl EntryKind {
    /// The `BibTeX` name of the entry type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::MastersThesis => "mastersthesis",
            Self::Misc => "misc",
            Self::PhdThesis => "phdthesis",
            Self::Proceedings => "proceedings",
            Self::TechReport => "techreport",
            Self::Other(name) => name,
        }
    }

    /// The kind for a `BibTeX` entry type name, case insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "mastersthesis" => Self::MastersThesis,
            "misc" => Self::Misc,
            "phdthesis" => Self::PhdThesis,
            "proceedings" => Self::Proceedings,
            "techreport" | "report" => Self::TechReport,
            other => Self::Other(Cow::Owned(other.to_owned())),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// A reference to an arXiv e-print.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eprint {
    /// The arXiv identifier, e.g. `1207.7214` or `0706.1234`.
    pub id: String,
    /// The primary category, e.g. `hep-ex`.
    pub category: Option<String>,
}

/// One bibliographic entry.
///
/// The citation `key` is the natural key of a record: it is unique within a retrieved batch and
/// within a bibliography. Every `BibTeX` field of the entry lives in `fields`, the typed
/// attributes (`title`, `authors`, `venue`, `year`) are derived from those fields so the two views
/// never disagree.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The citation key, e.g. `ATLAS:2012yve`.
    pub key: String,
    /// The `BibTeX` entry type.
    pub kind: EntryKind,
    /// The title without protecting braces, empty when unknown.
    pub title: String,
    /// Authors as listed, `Last, First`.
    pub authors: Vec<String>,
    /// Total number of authors, which may be larger than `authors.len()` for large
    /// collaborations.
    pub author_count: usize,
    /// Where the record appeared: journal, proceedings, school or publisher.
    pub venue: Option<String>,
    /// The publication year as stored in the `year` field.
    pub year: Option<String>,
    /// Every `BibTeX` field by lowercase name, values as written between the delimiters.
    pub fields: BTreeMap<String, String>,
    /// Other citation keys the record is known by.
    pub alt_keys: Vec<String>,
    /// Earliest known date of the record, `YYYY[-MM[-DD]]`.
    pub date: Option<String>,
    /// Alternative renderings of the record served by the API, by format name.
    pub links: BTreeMap<String, String>,
    /// The arXiv e-print, if any.
    pub eprint: Option<Eprint>,
}

impl Record {
    /// Creates a record from its `BibTeX` fields.
    ///
    /// Field names are normalized to lowercase and empty values are dropped.
    #[must_use]
    pub fn from_fields<I, K, V>(key: impl Into<String>, kind: EntryKind, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_lowercase(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect::<BTreeMap<_, _>>();

        let title = fields.get("title").map(|t| strip_braces(t)).unwrap_or_default();
        let authors = fields.get("author").map(|a| split_authors(a)).unwrap_or_default();
        let venue = ["journal", "booktitle", "school", "publisher", "institution"]
            .iter()
            .find_map(|name| fields.get(*name))
            .map(|v| strip_braces(v));
        let year = fields.get("year").cloned();
        let eprint = fields.get("eprint").map(|id| Eprint {
            id: id.clone(),
            category: fields.get("primaryclass").cloned(),
        });

        Self {
            key: key.into(),
            kind,
            title,
            author_count: authors.len(),
            authors,
            venue,
            date: year.clone(),
            year,
            fields,
            alt_keys: Vec::new(),
            links: BTreeMap::new(),
            eprint,
        }
    }

    /// Returns the value of a `BibTeX` field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Whether both records would be written as the same `BibTeX` entry, ignoring the key.
    #[must_use]
    pub fn same_entry(&self, other: &Self) -> bool {
        self.kind == other.kind && self.fields == other.fields
    }

    /// Replaces the bibliographic content of this record with that of `other`, keeping this
    /// record's citation key.
    pub fn update_from(&mut self, other: Self) {
        let key = std::mem::take(&mut self.key);
        *self = Self { key, ..other };
    }
}

/// Removes a single pair of enclosing braces, e.g. `{Observation of a new boson}`.
fn strip_braces(value: &str) -> String {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|inner| !inner.contains('{') && !inner.contains('}'))
        .unwrap_or(trimmed)
        .to_owned()
}

fn split_authors(value: &str) -> Vec<String> {
    value
        .split(" and ")
        .map(str::trim)
        .filter(|a| !a.is_empty() && *a != "others")
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::from_fields(
            "ATLAS:2012yve",
            EntryKind::Article,
            [
                ("Author", "Aad, Georges and Abajyan, Tatevik and others"),
                ("title", "{Observation of a new particle}"),
                ("journal", "Phys. Lett. B"),
                ("year", "2012"),
                ("note", "  "),
            ],
        )
    }

    #[test]
    fn typed_attributes_are_derived_from_fields() {
        let record = record();

        assert_eq!("Observation of a new particle", record.title);
        assert_eq!(vec!["Aad, Georges", "Abajyan, Tatevik"], record.authors);
        assert_eq!(Some("Phys. Lett. B"), record.venue.as_deref());
        assert_eq!(Some("2012"), record.year.as_deref());
    }

    #[test]
    fn field_names_are_lowercase_and_empty_values_dropped() {
        let record = record();

        assert!(record.field("AUTHOR").is_some());
        assert!(record.field("note").is_none());
    }

    #[test]
    fn nested_braces_in_title_are_kept() {
        let record = Record::from_fields(
            "key",
            EntryKind::Misc,
            [("title", "{Search for the {Higgs} boson}")],
        );

        assert_eq!("{Search for the {Higgs} boson}", record.title);
    }

    #[test]
    fn update_keeps_the_citation_key() {
        let mut stored = record();
        let mut upstream = Record::from_fields(
            "ATLAS:2012yve",
            EntryKind::Article,
            [("title", "{Observation of a new particle}"), ("year", "2013")],
        );
        upstream.key = "Renamed:2013".to_owned();

        stored.update_from(upstream);

        assert_eq!("ATLAS:2012yve", stored.key);
        assert_eq!(Some("2013"), stored.field("year"));
        assert!(stored.field("journal").is_none());
    }

    #[test]
    fn entry_kind_names_round_trip() {
        for name in ["article", "phdthesis", "inproceedings", "misc", "software"] {
            let kind: EntryKind = name.parse().unwrap();
            assert_eq!(name, kind.as_str());
        }
        assert_eq!(EntryKind::TechReport, "Report".parse().unwrap());
    }
}
