//! Choosing which retrieved records to keep.

use log::{debug, trace};

use crate::{api::literature::SearchResult, display, record::Record, Error};

/// Something able to ask the user which of a list of labels to keep.
pub trait Selector {
    /// Presents `labels` and returns the indices of the chosen ones.
    ///
    /// `None` means the user aborted, which is not an error.
    ///
    /// # Errors
    ///
    /// When the user cannot be asked at all, e.g. there is no terminal.
    fn present(&mut self, labels: &[String]) -> Result<Option<Vec<usize>>, Error>;
}

/// The citation keys chosen from one search, in the order they were retrieved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    keys: Vec<String>,
}

impl Selection {
    /// Whether the record with `key` was selected.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// The selected keys in the order they were shown.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The number of selected records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Keeps the selected records of `records`, in their original order.
    #[must_use]
    pub fn retain(&self, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .filter(|record| self.contains(&record.key))
            .collect()
    }
}

/// Lets the user pick among the records of `result`.
///
/// Every record is presented, in API order, labelled by [`display::label`]. The prompt is skipped
/// when the search matched at most one record in total: that record is selected. An abort or an
/// empty pick gives an empty [`Selection`].
///
/// # Errors
///
/// Any error of the [`Selector`].
pub fn select_records<S: Selector>(
    selector: &mut S,
    result: &SearchResult,
    max_authors: usize,
) -> Result<Selection, Error> {
    let records = &result.records;
    if records.is_empty() {
        return Ok(Selection::default());
    }

    if result.total <= 1 {
        trace!("Single match - selecting it without asking");
        return Ok(Selection {
            keys: records.iter().map(|r| r.key.clone()).collect(),
        });
    }

    let labels = records
        .iter()
        .map(|r| display::label(r, max_authors))
        .collect::<Vec<_>>();

    let Some(mut picked) = selector.present(&labels)? else {
        debug!("Selection aborted");
        return Ok(Selection::default());
    };
    picked.sort_unstable();
    picked.dedup();

    let keys = picked
        .into_iter()
        .filter_map(|i| records.get(i))
        .map(|r| r.key.clone())
        .collect();

    Ok(Selection { keys })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{assert_url, impl_text_producer, literature, MockClient},
        config::Settings,
        query::Query,
        record::EntryKind,
    };

    /// Answers with a fixed pick and remembers what it was shown.
    struct ScriptedSelector {
        answer: Option<Vec<usize>>,
        shown: Vec<Vec<String>>,
    }

    impl ScriptedSelector {
        fn answering(answer: Option<Vec<usize>>) -> Self {
            Self {
                answer,
                shown: Vec::new(),
            }
        }
    }

    impl Selector for ScriptedSelector {
        fn present(&mut self, labels: &[String]) -> Result<Option<Vec<usize>>, Error> {
            self.shown.push(labels.to_vec());
            Ok(self.answer.clone())
        }
    }

    fn result(keys: &[&str], total: u64) -> SearchResult {
        SearchResult {
            records: keys
                .iter()
                .map(|k| Record::from_fields(*k, EntryKind::Misc, [("title", *k)]))
                .collect(),
            total,
        }
    }

    impl_text_producer! {
        LiteratureProducer => Ok(include_str!("../tests/data/literature.json").to_owned()),
    }

    #[test]
    fn higgs_boson_discovery_results_are_presented_in_order() {
        let settings = Settings::default();
        let query = Query::builder("Higgs boson discovery", &settings)
            .size(Some(5))
            .sort(Some("mostrecent"))
            .build()
            .unwrap();
        let client = MockClient::<LiteratureProducer>::default();
        let result = literature::search(&client, &query.request(&settings.api_url)).unwrap();
        assert_url!(
            "https://inspirehep.net/api/literature?sort=mostrecent&size=5&q=Higgs+boson+discovery"
        );

        let mut selector = ScriptedSelector::answering(Some(vec![0]));
        let selection = select_records(&mut selector, &result, 5).unwrap();

        let expected = result
            .records
            .iter()
            .map(|r| display::label(r, 5))
            .collect::<Vec<_>>();
        assert_eq!(vec![expected], selector.shown);
        assert_eq!(vec!["ATLAS:2012yve"], selection.keys().collect::<Vec<_>>());
    }

    #[test]
    fn picked_indices_keep_api_order() {
        let mut selector = ScriptedSelector::answering(Some(vec![2, 0, 2]));
        let selection = select_records(&mut selector, &result(&["A", "B", "C"], 3), 5).unwrap();

        assert_eq!(vec!["A", "C"], selection.keys().collect::<Vec<_>>());
    }

    #[test]
    fn abort_is_an_empty_selection() {
        let mut selector = ScriptedSelector::answering(None);
        let selection = select_records(&mut selector, &result(&["A", "B"], 2), 5).unwrap();

        assert!(selection.is_empty());
    }

    #[test]
    fn empty_pick_is_an_empty_selection() {
        let mut selector = ScriptedSelector::answering(Some(Vec::new()));
        let selection = select_records(&mut selector, &result(&["A", "B"], 2), 5).unwrap();

        assert!(selection.is_empty());
    }

    #[test]
    fn single_match_is_selected_without_asking() {
        let mut selector = ScriptedSelector::answering(None);
        let selection = select_records(&mut selector, &result(&["A"], 1), 5).unwrap();

        assert!(selector.shown.is_empty());
        assert_eq!(vec!["A"], selection.keys().collect::<Vec<_>>());
    }

    #[test]
    fn no_records_asks_nothing() {
        let mut selector = ScriptedSelector::answering(Some(vec![0]));
        let selection = select_records(&mut selector, &result(&[], 0), 5).unwrap();

        assert!(selector.shown.is_empty());
        assert!(selection.is_empty());
    }

    #[test]
    fn retain_filters_records() {
        let mut selector = ScriptedSelector::answering(Some(vec![1]));
        let result = result(&["A", "B", "C"], 3);
        let selection = select_records(&mut selector, &result, 5).unwrap();

        let kept = selection.retain(result.records);

        assert_eq!(1, kept.len());
        assert_eq!("B", kept[0].key);
    }
}
