#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! # inspire
//!
//! inspire searches the [INSPIRE](https://inspirehep.net) literature database and keeps a local
//! `BibTeX` bibliography in sync with it.
//!
//! A search is described by a [`query::Query`], sent with [`api::literature::search`] and its
//! records chosen with [`select::select_records`]. The chosen records can be shown with
//! [`display::render`] or merged into a bibliography file with [`merge::append`], and every
//! entry of a bibliography can be refreshed from upstream with [`merge::update`].

pub mod api;
pub mod biblio;
pub mod config;
pub mod display;
mod error;
pub mod file;
pub mod format;
pub mod merge;
pub mod query;
pub mod record;
pub mod select;

pub use error::{Error, ErrorKind};
