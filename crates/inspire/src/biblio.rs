//! An ordered bibliography keyed by citation key.

use std::collections::HashMap;

use crate::record::Record;

/// An in-memory bibliography: records in file order, unique by citation key.
#[derive(Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct Biblio {
    dirty: bool,
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Biblio {
    /// Create a new [`Biblio`] from a list of records.
    ///
    /// When a key repeats, the later record replaces the earlier one in its position.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        let mut biblio = Self::default();
        for record in records {
            if let Some(existing) = biblio.get_mut(&record.key) {
                *existing = record;
            } else {
                biblio.push(record);
            }
        }
        biblio.dirty = false;
        biblio
    }

    /// Checks and resets the `dirty` flag.
    ///
    /// The `dirty` flag will return true when this instance has been edited since it was created.
    /// The default value of the `dirty` flag is `false`, therefore calling this function will
    /// always reset the `dirty` flag to `false`.
    pub fn dirty(&mut self) -> bool {
        let dirty = self.dirty;
        self.dirty = false;
        dirty
    }

    /// Appends `record` unless a record with the same key is already present.
    ///
    /// Returns whether the record was added.
    pub fn insert(&mut self, record: Record) -> bool {
        if self.contains(&record.key) {
            false
        } else {
            self.push(record);
            true
        }
    }

    /// Replaces the content of the record with the same key as `record`, in place.
    ///
    /// Returns `false`, and leaves the bibliography untouched, when no such record exists.
    pub fn replace(&mut self, record: Record) -> bool {
        match self.index.get(&record.key) {
            Some(&i) => {
                if !self.records[i].same_entry(&record) {
                    self.records[i].update_from(record);
                    self.dirty = true;
                }
                true
            }
            None => false,
        }
    }

    fn push(&mut self, record: Record) {
        self.dirty = true;
        self.index.insert(record.key.clone(), self.records.len());
        self.records.push(record);
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.index.get(key).map(|&i| &mut self.records[i])
    }

    /// Returns the record with the citation key `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Whether a record with the citation key `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// The citation keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key.as_str())
    }

    /// Return an iterator of the records in file order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
