//! The INSPIRE literature search endpoint.

use std::collections::{BTreeMap, HashSet};

use log::{debug, trace};
use serde::Deserialize;

use crate::{
    query::Request,
    record::{EntryKind, Eprint, Record},
    Error, ErrorKind,
};

use super::Client;

/// The records of one search, in the order the service returned them.
#[derive(Debug)]
pub struct SearchResult {
    /// At most the requested number of records, each with a unique key.
    pub records: Vec<Record>,
    /// Number of hits matching the query, which may exceed the requested size.
    pub total: u64,
}

/// Runs the search described by `request`.
///
/// Hits without a citation key are dropped, and so are hits repeating the key of an earlier one.
///
/// # Errors
///
/// [`ErrorKind::Network`], [`ErrorKind::Api`] or [`ErrorKind::Parse`] from the client; no records
/// are returned when any of them occurs.
pub fn search<C: Client>(client: &C, request: &Request) -> Result<SearchResult, Error> {
    let url = request.url()?;
    let LiteratureResponse {
        hits: Hits { hits, total },
    } = client.get_json(url.as_str())?;

    trace!("{} hits of {total} returned", hits.len());

    let mut seen = HashSet::new();
    let records = hits
        .into_iter()
        .filter_map(Hit::into_record)
        .filter(|record| {
            let fresh = seen.insert(record.key.clone());
            if !fresh {
                debug!("Dropping repeated record '{}'", record.key);
            }
            fresh
        })
        .collect();

    Ok(SearchResult { records, total })
}

/// Fetches the `format` rendering of `record` (e.g. `latex-eu` or `cv`) from its links.
///
/// # Errors
///
/// [`ErrorKind::InvalidOption`] when the record has no link for `format`, otherwise any error
/// from the client.
pub fn fetch_link<C: Client>(client: &C, record: &Record, format: &str) -> Result<String, Error> {
    let url = record.links.get(format).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOption,
            format!("no '{format}' rendering available for '{}'", record.key),
        )
    })?;

    client.get_text(url)
}

#[derive(Deserialize)]
struct LiteratureResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    hits: Vec<Hit>,
    total: u64,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(default)]
    links: BTreeMap<String, String>,
    metadata: Metadata,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct Metadata {
    texkeys: Vec<String>,
    titles: Vec<Title>,
    authors: Vec<Author>,
    author_count: Option<usize>,
    earliest_date: Option<String>,
    document_type: Vec<String>,
    publication_info: Vec<PublicationInfo>,
    dois: Vec<Value>,
    report_numbers: Vec<Value>,
    arxiv_eprints: Vec<ArxivEprint>,
    collaborations: Vec<Value>,
    thesis_info: Option<ThesisInfo>,
    imprints: Vec<Imprint>,
}

#[derive(Deserialize)]
struct Title {
    title: String,
}

#[derive(Deserialize)]
struct Author {
    full_name: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct PublicationInfo {
    journal_title: Option<String>,
    journal_volume: Option<String>,
    journal_issue: Option<String>,
    page_start: Option<String>,
    page_end: Option<String>,
    artid: Option<String>,
    year: Option<u16>,
    /// Title of the proceedings a conference paper appeared in.
    parent_title: Option<String>,
    conf_acronym: Option<String>,
}

#[derive(Deserialize)]
struct Value {
    value: String,
}

#[derive(Deserialize)]
struct ArxivEprint {
    value: String,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ThesisInfo {
    degree_type: Option<String>,
    institutions: Vec<Institution>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct Institution {
    name: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct Imprint {
    publisher: Option<String>,
    date: Option<String>,
}

impl Hit {
    fn into_record(self) -> Option<Record> {
        let Hit { links, metadata } = self;
        let mut texkeys = metadata.texkeys.clone().into_iter();
        let key = texkeys.next()?;

        let kind = metadata.kind();
        let fields = metadata.bibtex_fields();
        let listed_authors = metadata.authors.len();

        let mut record = Record::from_fields(key, kind, fields);
        record.alt_keys = texkeys.collect();
        record.author_count = metadata.author_count.unwrap_or(listed_authors);
        record.date = metadata.earliest_date.or_else(|| record.year.clone());
        record.links = links;
        record.eprint = metadata.arxiv_eprints.into_iter().next().map(|e| Eprint {
            id: e.value,
            category: e.categories.into_iter().next(),
        });

        Some(record)
    }
}

impl Metadata {
    fn kind(&self) -> EntryKind {
        let has_journal = self
            .publication_info
            .iter()
            .any(|p| p.journal_title.is_some());

        match self.document_type.first().map(String::as_str) {
            Some("article") if has_journal || !self.arxiv_eprints.is_empty() => EntryKind::Article,
            Some("conference paper") => EntryKind::InProceedings,
            Some("thesis") => match self.thesis_info.as_ref().and_then(|t| t.degree_type.as_deref()) {
                Some("master") | Some("diploma") | Some("bachelor") => EntryKind::MastersThesis,
                _ => EntryKind::PhdThesis,
            },
            Some("book") => EntryKind::Book,
            Some("book chapter") => EntryKind::InCollection,
            Some("proceedings") => EntryKind::Proceedings,
            Some("report") => EntryKind::TechReport,
            _ => EntryKind::Misc,
        }
    }

    /// The `BibTeX` fields of the record, only those with a value upstream.
    fn bibtex_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                fields.push((name, value));
            }
        };

        if !self.authors.is_empty() {
            let mut author = self
                .authors
                .iter()
                .map(|a| a.full_name.as_str())
                .collect::<Vec<_>>()
                .join(" and ");
            if self.author_count.map_or(false, |count| count > self.authors.len()) {
                author.push_str(" and others");
            }
            push("author", Some(author));
        }

        push(
            "collaboration",
            join_values(self.collaborations.iter().map(|c| c.value.as_str())),
        );
        push("title", self.titles.first().map(|t| format!("{{{}}}", t.title)));

        let publication = self
            .publication_info
            .iter()
            .find(|p| p.journal_title.is_some());
        if let Some(p) = publication {
            push("journal", p.journal_title.clone());
            push("volume", p.journal_volume.clone());
            push("number", p.journal_issue.clone());
            push("pages", pages(p));
        }

        if matches!(self.kind(), EntryKind::InProceedings | EntryKind::InCollection) {
            let proceedings = self
                .publication_info
                .iter()
                .find(|p| p.parent_title.is_some() || p.conf_acronym.is_some());
            if let Some(p) = proceedings {
                push("booktitle", p.parent_title.clone().or_else(|| p.conf_acronym.clone()));
                if publication.is_none() {
                    push("pages", pages(p));
                }
            }
        }

        let imprint = self.imprints.first();
        let thesis = self.thesis_info.as_ref();
        push("publisher", imprint.and_then(|i| i.publisher.clone()));
        push(
            "school",
            thesis.and_then(|t| join_values(t.institutions.iter().map(|i| i.name.as_str()))),
        );

        let year = publication
            .and_then(|p| p.year)
            .or_else(|| self.publication_info.iter().find_map(|p| p.year))
            .map(|y| y.to_string())
            .or_else(|| thesis.and_then(|t| year_of(t.date.as_deref())))
            .or_else(|| imprint.and_then(|i| year_of(i.date.as_deref())))
            .or_else(|| year_of(self.earliest_date.as_deref()));
        push("year", year);

        if let Some(eprint) = self.arxiv_eprints.first() {
            push("eprint", Some(eprint.value.clone()));
            push("archiveprefix", Some("arXiv".to_owned()));
            push("primaryclass", eprint.categories.first().cloned());
        }
        push("doi", self.dois.first().map(|d| d.value.clone()));
        let report_numbers = self
            .report_numbers
            .iter()
            .map(|r| r.value.as_str())
            .collect::<Vec<_>>();
        if !report_numbers.is_empty() {
            push("reportnumber", Some(report_numbers.join(", ")));
        }

        fields
    }
}

fn join_values<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined = values.collect::<Vec<_>>().join(" and ");
    Some(joined).filter(|s| !s.is_empty())
}

fn pages(p: &PublicationInfo) -> Option<String> {
    match (&p.page_start, &p.page_end) {
        (Some(start), Some(end)) => Some(format!("{start}--{end}")),
        (Some(start), None) => Some(start.clone()),
        _ => p.artid.clone(),
    }
}

fn year_of(date: Option<&str>) -> Option<String> {
    date.and_then(|d| d.get(..4))
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{assert_url, impl_text_producer, MockClient, NetworkErrorProducer},
        config::Settings,
        query::Query,
    };

    const LITERATURE_JSON: &str = include_str!("../../tests/data/literature.json");

    impl_text_producer! {
        LiteratureProducer => Ok(LITERATURE_JSON.to_owned()),
        EmptyHitsProducer => Ok(r#"{"hits": {"hits": [], "total": 0}}"#.to_owned()),
        WrongSchemaProducer => Ok(r#"{"results": []}"#.to_owned()),
        ConferenceProducer => Ok(r#"{"hits": {"total": 1, "hits": [{"links": {}, "metadata": {
            "texkeys": ["Bloggs:2013abc"],
            "titles": [{"title": "Higgs couplings at the LHC"}],
            "authors": [{"full_name": "Bloggs, Joe"}],
            "document_type": ["conference paper"],
            "publication_info": [{
                "cnum": "C12-07-04",
                "conf_acronym": "ICHEP 2012",
                "parent_title": "Proceedings, 36th International Conference on High Energy Physics",
                "page_start": "12",
                "page_end": "18",
                "year": 2013
            }],
            "report_numbers": [{"value": "CERN-PH-TH-2012-300"}, {"value": "DESY-12-999"}]
        }}]}}"#.to_owned()),
    }

    fn request(text: &str) -> Request {
        let settings = Settings::default();
        Query::builder(text, &settings)
            .size(Some(5))
            .sort(Some("mostrecent"))
            .build()
            .unwrap()
            .request(&settings.api_url)
    }

    fn search_fixture() -> SearchResult {
        search(&MockClient::<LiteratureProducer>::default(), &request("higgs"))
            .expect("fixture is a valid literature response")
    }

    #[test]
    fn search_requests_the_literature_endpoint() {
        let client = MockClient::<EmptyHitsProducer>::default();
        search(&client, &request("Higgs boson discovery")).unwrap();

        assert_url!(
            "https://inspirehep.net/api/literature?sort=mostrecent&size=5&q=Higgs+boson+discovery"
        );
    }

    #[test]
    fn empty_hits_is_not_an_error() {
        let client = MockClient::<EmptyHitsProducer>::default();
        let result = search(&client, &request("nothing")).unwrap();

        assert!(result.records.is_empty());
        assert_eq!(0, result.total);
    }

    #[test]
    fn records_keep_response_order_and_skip_keyless_and_repeated_hits() {
        let result = search_fixture();
        let keys = result.records.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();

        assert_eq!(
            vec!["ATLAS:2012yve", "CMS:2012qbp", "Smith:2019abc", "Doe:2021xyz"],
            keys
        );
        assert_eq!(2451, result.total);
    }

    #[test]
    fn article_metadata_maps_to_bibtex_fields() {
        let record = search_fixture().records.remove(0);

        assert_eq!(EntryKind::Article, record.kind);
        assert_eq!(
            "Observation of a new particle in the search for the Standard Model Higgs boson with the ATLAS detector at the LHC",
            record.title
        );
        assert_eq!(Some("Phys. Lett. B"), record.field("journal"));
        assert_eq!(Some("716"), record.field("volume"));
        assert_eq!(Some("1--29"), record.field("pages"));
        assert_eq!(Some("2012"), record.field("year"));
        assert_eq!(Some("1207.7214"), record.field("eprint"));
        assert_eq!(Some("hep-ex"), record.field("primaryclass"));
        assert_eq!(Some("10.1016/j.physletb.2012.08.020"), record.field("doi"));
        assert_eq!(Some("ATLAS"), record.field("collaboration"));
        assert_eq!(
            Some("Aad, Georges and Abajyan, Tatevik and others"),
            record.field("author")
        );
        assert_eq!(2932, record.author_count);
        assert_eq!(vec!["Aad:2012tfa".to_owned()], record.alt_keys);
        assert_eq!(Some("2012-07-31"), record.date.as_deref());
        assert!(record.links.contains_key("latex-eu"));
    }

    #[test]
    fn thesis_maps_to_phdthesis_with_school() {
        let record = search_fixture()
            .records
            .into_iter()
            .find(|r| r.key == "Smith:2019abc")
            .unwrap();

        assert_eq!(EntryKind::PhdThesis, record.kind);
        assert_eq!(Some("Oxford U."), record.field("school"));
        assert_eq!(Some("2019"), record.field("year"));
        assert!(record.field("journal").is_none());
    }

    #[test]
    fn missing_upstream_fields_are_not_fabricated() {
        let record = search_fixture()
            .records
            .into_iter()
            .find(|r| r.key == "Doe:2021xyz")
            .unwrap();

        assert_eq!(EntryKind::Misc, record.kind);
        assert_eq!(
            vec!["author", "title", "year"],
            record.fields.keys().map(String::as_str).collect::<Vec<_>>()
        );
        assert!(record.eprint.is_none());
    }

    #[test]
    fn network_error_is_propagated() {
        let err = search(&MockClient::<NetworkErrorProducer>::default(), &request("higgs"))
            .expect_err("NetworkErrorProducer always fails");

        assert_eq!(ErrorKind::Network, err.kind());
    }

    #[test]
    fn unexpected_schema_is_a_parse_error() {
        let err = search(&MockClient::<WrongSchemaProducer>::default(), &request("higgs"))
            .expect_err("missing hits");

        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().contains(r#"{"results": []}"#));
    }

    #[test]
    fn fetch_link_uses_the_record_links() {
        let record = search_fixture().records.remove(0);
        let client = MockClient::<EmptyHitsProducer>::default();

        fetch_link(&client, &record, "latex-eu").unwrap();
        assert_url!("https://inspirehep.net/api/literature/1124337?format=latex-eu");

        let err = fetch_link(&client, &record, "nope").unwrap_err();
        assert_eq!(ErrorKind::InvalidOption, err.kind());
    }

    #[test]
    fn conference_paper_is_an_inproceedings_with_booktitle_and_report_numbers() {
        use crate::format::{BibTex, Format};

        let record = search(&MockClient::<ConferenceProducer>::default(), &request("higgs"))
            .unwrap()
            .records
            .remove(0);

        // indents and newlines are important in this string so don't format!
        let expected = "@inproceedings{Bloggs:2013abc,
    author = {Bloggs, Joe},
    title = {{Higgs couplings at the LHC}},
    booktitle = {Proceedings, 36th International Conference on High Energy Physics},
    pages = {12--18},
    year = {2013},
    reportnumber = {CERN-PH-TH-2012-300, DESY-12-999},
}\n";
        assert_eq!(expected, BibTex::compose_entry(&record));
        assert_eq!(
            Some("Proceedings, 36th International Conference on High Energy Physics"),
            record.venue.as_deref()
        );
    }
}
