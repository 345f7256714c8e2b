//! Downloading the arXiv PDF of a record.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use log::{info, trace};

use crate::{record::Record, Error, ErrorKind};

use super::Client;

const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf/";

/// The PDF URL of the record's e-print, `None` when the record has no arXiv e-print.
///
/// Old style identifiers (before 2007, e.g. `0612345`) need their primary category as a prefix,
/// see <https://info.arxiv.org/help/arxiv_identifier_for_services.html>.
#[must_use]
pub fn pdf_url(record: &Record) -> Option<String> {
    let eprint = record.eprint.as_ref()?;

    let new_style = eprint
        .id
        .split_once('.')
        .map_or(false, |(yymm, num)| {
            !yymm.is_empty()
                && !num.is_empty()
                && yymm.chars().all(|c| c.is_ascii_digit())
                && num.chars().take_while(|c| *c != 'v').all(|c| c.is_ascii_digit())
        });

    let id = match (&eprint.category, new_style) {
        (Some(category), false) if !eprint.id.contains('/') => format!("{category}/{}", eprint.id),
        _ => eprint.id.clone(),
    };

    Some(format!("{ARXIV_PDF_URL}{id}.pdf"))
}

/// Downloads the PDF of `record` into `dir` as `<key>.pdf` and returns its path.
///
/// Existing files are never overwritten.
///
/// # Errors
///
/// [`ErrorKind::InvalidOption`] when the record has no arXiv e-print, [`ErrorKind::Io`] when the
/// file already exists or cannot be written, and any error from the client.
pub fn download_pdf<C: Client>(client: &C, record: &Record, dir: &Path) -> Result<PathBuf, Error> {
    let url = pdf_url(record).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOption,
            format!("'{}' has no arXiv entry for PDF download", record.key),
        )
    })?;

    let path = dir.join(format!("{}.pdf", record.key.replace('/', "_")));
    if path.exists() {
        return Err(Error::new(
            ErrorKind::Io,
            format!("'{}' already exists", path.display()),
        ));
    }

    trace!("Downloading {url}");
    let bytes = client.get_bytes(&url)?;

    std::fs::create_dir_all(dir)
        .and_then(|_| OpenOptions::new().write(true).create_new(true).open(&path))
        .and_then(|mut file| file.write_all(&bytes))
        .map_err(|e| {
            Error::wrap_with(
                ErrorKind::Io,
                e,
                format!("Cannot save the PDF to '{}'", path.display()),
            )
        })?;

    info!("Saved '{}'", path.display());
    Ok(path)
}
