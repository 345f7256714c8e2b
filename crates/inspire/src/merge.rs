//! Merging retrieved records into a bibliography.

use log::{debug, info, warn};

use crate::{
    api::{literature, Client},
    biblio::Biblio,
    query::Query,
    record::Record,
    Error,
};

/// How retrieved records are merged into a bibliography.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeMode {
    /// Add new records, leaving existing ones alone.
    Append,
    /// Refresh every existing record from upstream.
    Update,
}

/// What a merge did to the bibliography.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records appended.
    pub added: usize,
    /// Records not appended because their key was already present.
    pub skipped: usize,
    /// Records refreshed from upstream.
    pub updated: usize,
    /// Records kept as they were because upstream had no match.
    pub not_updated: usize,
    /// Keys of the appended records, in insertion order.
    pub added_keys: Vec<String>,
}

/// Appends `records` in order, skipping any whose key is already in `biblio`.
pub fn append(biblio: &mut Biblio, records: impl IntoIterator<Item = Record>) -> Summary {
    let mut summary = Summary::default();

    for record in records {
        let key = record.key.clone();
        if biblio.insert(record) {
            debug!("Added '{key}'");
            summary.added += 1;
            summary.added_keys.push(key);
        } else {
            info!("Entry '{key}' found in the bibliography - skipping");
            summary.skipped += 1;
        }
    }

    summary
}

/// Refreshes every record of `biblio` with its upstream version.
///
/// Each key is looked up with [`Query::for_key`]. A record is replaced in place only when
/// upstream returns a record with exactly the same key; records that vanished or were renamed
/// upstream are left untouched and counted as not updated. The key set of `biblio` never
/// changes. `progress` is called with each key before it is looked up.
///
/// # Errors
///
/// Any error from the client. `biblio` may then be partially refreshed, so it should not be
/// written.
pub fn update<C, P>(
    biblio: &mut Biblio,
    client: &C,
    api_url: &str,
    mut progress: P,
) -> Result<Summary, Error>
where
    C: Client,
    P: FnMut(&str),
{
    let mut summary = Summary::default();
    let keys = biblio.keys().map(str::to_owned).collect::<Vec<_>>();

    for key in keys {
        progress(&key);
        let request = Query::for_key(&key).request(api_url);
        let upstream = literature::search(client, &request)?
            .records
            .into_iter()
            .find(|record| record.key == key);

        let replaced = match upstream {
            Some(record) => biblio.replace(record),
            None => false,
        };

        if replaced {
            summary.updated += 1;
        } else {
            warn!("'{key}' was not found upstream - keeping the stored entry");
            summary.not_updated += 1;
        }
    }

    Ok(summary)
}
