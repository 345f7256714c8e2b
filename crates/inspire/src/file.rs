//! Reading and atomically replacing a bibliography file.

use std::{
    fs,
    io::{self, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use tempfile::NamedTempFile;

use crate::{
    format::{Format, Reader, Writer},
    Error, ErrorKind,
};

/// A bibliography file on disk holding the [`Format`] `F`.
///
/// The file does not need to exist: reading a missing file gives an empty
/// [`Biblio`](crate::biblio::Biblio) and the first write creates it.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct FormatFile<F: Format> {
    path: PathBuf,
    _format: PhantomData<F>,
}

impl<F: Format> FormatFile<F> {
    /// The bibliography at `path`; nothing is read until [`Reader::read`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _format: PhantomData,
        }
    }

    /// The path as given, before any symlink is resolved.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `format` to a temporary file next to the target without touching the target.
    ///
    /// A symlinked target is resolved first so the link itself is kept, and the temporary file
    /// takes the permissions of an existing target. The target is only replaced by
    /// [`StagedWrite::commit`]; dropping the [`StagedWrite`] removes the temporary file.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::StoreWrite`] when the directory cannot be created or the temporary file
    /// cannot be written.
    pub fn stage(&self, format: F) -> Result<StagedWrite, Error> {
        let target = resolve_symlink(&self.path);
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let raw = format.raw();
        let temp = fs::create_dir_all(dir)
            .and_then(|_| NamedTempFile::new_in(dir))
            .and_then(|mut temp| {
                if let Ok(metadata) = fs::metadata(&target) {
                    temp.as_file().set_permissions(metadata.permissions())?;
                }
                temp.write_all(raw.as_bytes())?;
                temp.as_file().sync_all()?;
                Ok(temp)
            })
            .map_err(|e| self.write_error(e))?;

        trace!("Staged {} bytes in '{}'", raw.len(), temp.path().display());
        Ok(StagedWrite { temp, target })
    }

    fn write_error(&self, source: io::Error) -> Error {
        Error::wrap_with(
            ErrorKind::StoreWrite,
            source,
            format!("Cannot write the bibliography '{}'", self.path.display()),
        )
    }
}

impl<F: Format> Reader for FormatFile<F> {
    type Format = F;

    fn read(&mut self) -> Result<Self::Format, Error> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(F::new(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "'{}' does not exist yet - starting from an empty bibliography",
                    self.path.display()
                );
                Ok(F::new(String::new()))
            }
            Err(e) => Err(Error::wrap_with(
                ErrorKind::StoreParse,
                e,
                format!("Cannot read the bibliography '{}'", self.path.display()),
            )),
        }
    }
}

impl<F: Format> Writer for FormatFile<F> {
    type Format = F;

    fn write(&mut self, format: F) -> Result<(), Error> {
        self.stage(format)?.commit()
    }
}

/// The file a chain of symlinks ends at, or `path` itself when it is not a symlink.
fn resolve_symlink(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }

    // a dangling link is replaced by the file it points to
    match fs::read_link(path) {
        Ok(link) => match path.parent() {
            Some(parent) => parent.join(link),
            None => link,
        },
        Err(_) => path.to_path_buf(),
    }
}

/// A composed bibliography waiting in a temporary file to replace its target.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    /// Atomically replaces the target file with the staged content.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::StoreWrite`] when the rename fails, in which case the target is unchanged.
    pub fn commit(self) -> Result<(), Error> {
        let target = self.target;
        self.temp.persist(&target).map_err(|e| {
            Error::wrap_with(
                ErrorKind::StoreWrite,
                e.error,
                format!("Cannot replace the bibliography '{}'", target.display()),
            )
        })?;

        debug!("Wrote '{}'", target.display());
        Ok(())
    }
}
