use crate::{
    biblio::Biblio,
    record::{EntryKind, Record},
    Error, ErrorKind,
};

use super::{scan::scan, Format};

/// Fields written first, in this order; every other field follows in alphabetical order.
const LEADING_FIELDS: [&str; 11] = [
    "author",
    "collaboration",
    "title",
    "booktitle",
    "journal",
    "school",
    "publisher",
    "volume",
    "number",
    "pages",
    "year",
];

/// A type wrapper around [`String`] to represent a `BibTex` format string.
#[derive(Debug)]
pub struct BibTex(String);

impl Format for BibTex {
    fn new(val: String) -> Self {
        Self(val)
    }

    fn parse(self) -> Result<Biblio, Error> {
        let entries = scan(&self.0)?;

        let mut records: Vec<Record> = Vec::with_capacity(entries.len());
        for entry in entries {
            // a second entry with the same key would be lost on the next write
            if records.iter().any(|record| record.key == entry.key) {
                return Err(Error::new(
                    ErrorKind::StoreParse,
                    format!("Duplicate key '{}' on line {}", entry.key, entry.line),
                ));
            }

            let kind = entry_kind(biblatex::EntryType::new(entry.kind));
            records.push(Record::from_fields(entry.key, kind, entry.fields));
        }

        Ok(Biblio::new(records))
    }

    fn compose(biblio: &Biblio) -> Self {
        let bib = biblio
            .records()
            .map(Self::compose_entry)
            .collect::<Vec<_>>()
            .join("\n");

        Self(bib)
    }

    fn compose_entry(record: &Record) -> String {
        format!(
            "@{}{{{},\n{}}}\n",
            record.kind,
            record.key,
            compose_fields(record)
        )
    }

    fn raw(self) -> String {
        self.0
    }
}

fn compose_fields(record: &Record) -> String {
    let leading = LEADING_FIELDS
        .iter()
        .filter_map(|name| record.fields.get_key_value(*name));
    let rest = record
        .fields
        .iter()
        .filter(|(name, _)| !LEADING_FIELDS.contains(&name.as_str()));

    leading
        .chain(rest)
        .map(|(name, value)| format!("    {name} = {{{value}}},\n"))
        .collect()
}

fn entry_kind(entry_type: biblatex::EntryType) -> EntryKind {
    use biblatex::EntryType;

    match entry_type.to_bibtex() {
        EntryType::Article => EntryKind::Article,
        EntryType::Book => EntryKind::Book,
        EntryType::InCollection => EntryKind::InCollection,
        EntryType::InProceedings => EntryKind::InProceedings,
        EntryType::MastersThesis => EntryKind::MastersThesis,
        EntryType::PhdThesis => EntryKind::PhdThesis,
        EntryType::TechReport | EntryType::Report => EntryKind::TechReport,
        EntryType::Proceedings => EntryKind::Proceedings,
        other => EntryKind::from_name(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn record() -> Record {
        Record::from_fields(
            "ATLAS:2012yve",
            EntryKind::Article,
            [
                ("author", "Aad, Georges and others"),
                ("title", "{Observation of a new particle}"),
                ("journal", "Phys. Lett. B"),
                ("volume", "716"),
                ("year", "2012"),
                ("eprint", "1207.7214"),
                ("archiveprefix", "arXiv"),
            ],
        )
    }

    #[test]
    fn parsing_an_empty_string_returns_an_empty_biblio() {
        let biblio = BibTex::new(String::new())
            .parse()
            .expect("Empty string is a valid BibTeX");

        assert!(biblio.is_empty());
    }

    #[test]
    fn comments_only_is_an_empty_biblio() {
        let biblio = BibTex::new("% my references\n@comment{nothing yet}\n".to_owned())
            .parse()
            .expect("Comments are valid BibTeX");

        assert!(biblio.is_empty());
    }

    #[test]
    fn compose_entry_writes_leading_fields_first() {
        // indents and newlines are important in this string so don't format!
        let expected = "@article{ATLAS:2012yve,
    author = {Aad, Georges and others},
    title = {{Observation of a new particle}},
    journal = {Phys. Lett. B},
    volume = {716},
    year = {2012},
    archiveprefix = {arXiv},
    eprint = {1207.7214},
}\n";

        assert_eq!(expected, BibTex::compose_entry(&record()));
    }

    #[test]
    fn compose_separates_entries_with_a_blank_line() {
        let second = Record::from_fields("B", EntryKind::Misc, [("title", "Second")]);
        let biblio = Biblio::new(vec![record(), second]);

        let raw = BibTex::compose(&biblio).raw();

        assert!(raw.contains("}\n\n@misc{B,\n    title = {Second},\n}\n"));
        assert!(raw.starts_with("@article{ATLAS:2012yve,"));
    }

    #[test]
    fn compose_then_parse_keeps_key_kind_and_fields() {
        let original = record();
        let biblio = Biblio::new(vec![original.clone()]);

        let parsed = BibTex::compose(&biblio)
            .parse()
            .expect("composed BibTeX is valid");
        let record = parsed.get("ATLAS:2012yve").expect("key survives");

        assert_eq!(original.kind, record.kind);
        assert_eq!(original.fields, record.fields);
        assert_eq!(original.title, record.title);
        assert_eq!(original.authors, record.authors);
    }

    #[test]
    fn parse_keeps_file_order() {
        let raw = "@misc{Zeta, title={Z},}\n@misc{Alpha, title={A},}\n@misc{Mid, title={M},}\n";
        let biblio = BibTex::new(raw.to_owned()).parse().unwrap();

        assert_eq!(vec!["Zeta", "Alpha", "Mid"], biblio.keys().collect::<Vec<_>>());
    }

    #[test]
    fn parse_reads_thesis_kind() {
        let raw = "@phdthesis{Smith:2019abc, author={Smith, Jane}, title={Searches}, school={Oxford U.}, year={2019},}";
        let biblio = BibTex::new(raw.to_owned()).parse().unwrap();
        let record = biblio.get("Smith:2019abc").unwrap();

        assert_eq!(EntryKind::PhdThesis, record.kind);
        assert_eq!(Some("Oxford U."), record.venue.as_deref());
    }

    #[test]
    fn garbage_is_a_store_parse_error() {
        let err = BibTex::new("@article{broken, title = {never closed".to_owned())
            .parse()
            .expect_err("unterminated entry");

        assert_eq!(ErrorKind::StoreParse, err.kind());
    }

    #[test]
    fn nested_braces_survive_a_round_trip() {
        let raw = "@misc{key, title = {Search for the {Higgs} boson},}";
        let parsed = BibTex::new(raw.to_owned()).parse().unwrap();
        let record = parsed.get("key").unwrap();

        assert_eq!(Some("Search for the {Higgs} boson"), record.field("title"));
    }

    #[test]
    fn latex_in_values_survives_a_round_trip() {
        // indents and newlines are important in this string so don't format!
        let stored = r#"@article{CMS:2022dwd,
    author = {M{\"u}ller, Hans and O'Brien, Ann},
    title = {Search for $H \to \gamma\gamma$ at $\sqrt{s}=13$ TeV \& more},
    journal = {Eur. Phys. J. C},
    year = {2022},
}
"#;

        let biblio = BibTex::new(stored.to_owned()).parse().unwrap();
        let record = biblio.get("CMS:2022dwd").unwrap();
        assert_eq!(
            Some(r"Search for $H \to \gamma\gamma$ at $\sqrt{s}=13$ TeV \& more"),
            record.field("title")
        );

        assert_eq!(stored, BibTex::compose(&biblio).raw());
    }

    #[test]
    fn unterminated_entry_after_a_good_one_is_rejected() {
        let raw = "@article{one, title = {A}}\n@article{two, title = {B\n";

        let err = BibTex::new(raw.to_owned()).parse().unwrap_err();

        assert_eq!(ErrorKind::StoreParse, err.kind());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let raw = "@misc{Same, title = {A}}\n@article{Same, title = {B}}\n";

        let err = BibTex::new(raw.to_owned()).parse().unwrap_err();

        assert_eq!(ErrorKind::StoreParse, err.kind());
    }

    #[test]
    fn conference_and_report_kinds_are_mapped() {
        let raw = "@conference{a, title = {A}}\n@report{b, title = {B}}\n@online{c, title = {C}}\n";
        let biblio = BibTex::new(raw.to_owned()).parse().unwrap();

        let kinds = biblio.records().map(|r| r.kind.clone()).collect::<Vec<_>>();
        assert_eq!(
            vec![EntryKind::InProceedings, EntryKind::TechReport, EntryKind::Misc],
            kinds
        );
    }
}
