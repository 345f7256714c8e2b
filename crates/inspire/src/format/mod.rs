//! Contains traits and implementions of the [`Format`], [`Reader`], and [`Writer`] trait.

mod bibtex;
mod scan;

use crate::{biblio::Biblio, record::Record, Error};
pub use bibtex::BibTex;

/// A textual representation that can be parsed into and composed from a [`Biblio`].
///
/// Formats are promises at the type level about what a [`String`] (or similar) represents.
pub trait Format {
    /// Construct a new type using a [`String`] input.
    ///
    /// This function should not panic or fail as creating a [`Format`] is a type promise about
    /// what the [`String`] represents.
    fn new(val: String) -> Self;

    /// Parses this [`Format`] into a [`Biblio`].
    ///
    /// # Errors
    ///
    /// Will return [`Err`] if it's not possible to parse this [`Format`] to [`Biblio`].
    fn parse(self) -> Result<Biblio, Error>;

    /// Composes a [`Biblio`] to this [`Format`], keeping the order of the records.
    fn compose(biblio: &Biblio) -> Self;

    /// Composes a single [`Record`] to a [`String`].
    ///
    /// Only the fields present in the record are written.
    fn compose_entry(record: &Record) -> String;

    /// The current [`Format`] in a raw [`String`].
    fn raw(self) -> String;
}

/// A trait for objects which are [`Format`]-oriented sinks.
///
/// Writers have a default implemention of [`Writer::write_ast`] for [`Biblio`] using the
/// [`Writer::write`] method.
pub trait Writer {
    /// The format associated with the writer.
    type Format: Format;

    /// Write a format into this writer.
    ///
    /// # Errors
    ///
    /// The call to write should only return an [`Err`] when writing to the writer cannot be
    /// completed.
    fn write(&mut self, format: Self::Format) -> Result<(), Error>;

    /// Write a [`Biblio`] into this writer using [`Format::compose`] from the [`Writer::Format`]
    /// associated type.
    ///
    /// # Errors
    ///
    /// The call to write should only return an [`Err`] when writing to the writer cannot be
    /// completed.
    fn write_ast(&mut self, ast: &Biblio) -> Result<(), Error> {
        let format = Self::Format::compose(ast);
        self.write(format)
    }
}

/// The [`Reader`] trait allows for reading a [`Format`] from a source.
///
/// Readers have a default implemention of [`Reader::read_ast`] for [`Biblio`] using the
/// [`Reader::read`] method.
pub trait Reader {
    /// The format associated with the reader.
    type Format: Format;

    /// Pull some bytes from this reader in order to produce a [`Reader::Format`] instance.
    ///
    /// # Errors
    /// If this method encounters any form of error making it unable to read the bytes in order to
    /// create the format.
    fn read(&mut self) -> Result<Self::Format, Error>;

    /// Read bytes from this reader using [`Reader::read`] and then parse using [`Format::parse`]
    /// with the associated [`Reader::Format`] type.
    ///
    /// # Errors
    /// This will return [`Err`] if there is an error from [`Reader::read`] or an error when parsing
    /// using [`Format::parse`].
    fn read_ast(&mut self) -> Result<Biblio, Error> {
        let format = self.read()?;
        format.parse()
    }
}
