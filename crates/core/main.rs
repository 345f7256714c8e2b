#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![allow(clippy::as_conversions, clippy::mod_module_files)]

use std::{path::PathBuf, process};

mod app;
mod interact;

use inspire::{
    config::Settings, display::DisplayMode, merge::MergeMode, query::Query, Error, ErrorKind,
};

use clap::Parser;
use eyre::Result;
use log::{error, trace, warn};

fn main() {
    if let Err(err) = try_main() {
        if log::log_enabled!(log::Level::Error) {
            error!("{:#}", err);
        } else {
            // the logger was never set up
            eprintln!("{:#}", err);
        }
        process::exit(2);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    setup_errlog(cli.verbosity as usize, cli.quiet)?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(page_size) = cli.page_size {
        if page_size == 0 {
            return Err(Error::new(ErrorKind::InvalidOption, "page size must be positive").into());
        }
        settings.page_size = page_size;
    }

    let bib = cli
        .bib
        .map(|file| file.unwrap_or_else(|| settings.bib_file.clone()));
    let display = cli.display.map(|mode| mode.unwrap_or(settings.display));
    let mode = if cli.update {
        MergeMode::Update
    } else {
        MergeMode::Append
    };

    let app = app::App::new(settings, cli.quiet)?;

    if mode == MergeMode::Update {
        if !cli.query.is_empty() {
            warn!("--update refreshes the whole bibliography - ignoring the query");
        }
        let path = bib.unwrap_or_else(|| app.settings().bib_file.clone());
        let summary = app.merge(&path, mode, Vec::new())?;
        println!(
            "{}: {} updated, {} not updated",
            path.display(),
            summary.updated,
            summary.not_updated
        );
        return Ok(());
    }

    // validated before any request is sent
    let query = Query::builder(&cli.query.join(" "), app.settings())
        .size(cli.size)
        .sort(cli.sort.as_deref())
        .build()?;
    trace!("Searching for {query:?}");

    let records = app.search_and_select(&query)?;
    if records.is_empty() {
        return Ok(());
    }

    match (bib, display) {
        (Some(path), None) => {
            let summary = app.merge(&path, mode, records.clone())?;
            println!(
                "{}: {} added, {} skipped",
                path.display(),
                summary.added,
                summary.skipped
            );
            if cli.pdf {
                let added = records
                    .into_iter()
                    .filter(|record| summary.added_keys.contains(&record.key))
                    .collect::<Vec<_>>();
                app.download_pdfs(&added)?;
            }
        }
        (_, display) => {
            if cli.pdf {
                warn!("--pdf only applies when adding to a bibliography");
            }
            app.display(&records, display.unwrap_or(app.settings().display))?;
        }
    }

    Ok(())
}

fn setup_errlog(verbosity: usize, quiet: bool) -> Result<()> {
    // if quiet then ignore verbosity but still show errors
    let verbosity = if quiet { 0 } else { verbosity + 1 };

    stderrlog::new().verbosity(verbosity).init()?;
    Ok(())
}

#[derive(Parser)]
#[clap(name = "inspire")]
#[clap(about = "Search the INSPIRE literature database and keep a BibTeX bibliography up to date")]
#[clap(version, author)]
struct Cli {
    /// The INSPIRE search query, e.g. `t higgs boson and date 2012`
    #[clap(required_unless_present = "update")]
    query: Vec<String>,

    /// Display the selected records instead of adding them to the bibliography
    ///
    /// One of short, verbose, bibtex, latex-eu, latex-us, json, cv or citations. Without a value
    /// the configured mode is used; a value must be given as `--display=MODE`.
    #[clap(short, long, value_name = "MODE", require_equals = true)]
    display: Option<Option<DisplayMode>>,

    /// Number of records to retrieve [default: from configuration]
    #[clap(long, allow_hyphen_values = true)]
    size: Option<i64>,

    /// Sort order of the records, mostrecent or mostcited [default: from configuration]
    #[clap(long, value_name = "ORDER")]
    sort: Option<String>,

    /// Add the selected records to a bibliography file
    ///
    /// Without a value the configured file is used; a value must be given as `--bib=FILE`.
    #[clap(short, long, value_name = "FILE", require_equals = true)]
    bib: Option<Option<PathBuf>>,

    /// Refresh every entry of the bibliography file from INSPIRE
    #[clap(short, long)]
    update: bool,

    /// Number of records shown per page when selecting [default: from configuration]
    #[clap(long)]
    page_size: Option<usize>,

    /// Download the arXiv PDF of every record added to the bibliography
    #[clap(long)]
    pdf: bool,

    /// The configuration file to use instead of the default one
    #[clap(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// How chatty the program is when performing commands
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,

    /// Only show errors, no progress or log messages.
    #[clap(short, long)]
    quiet: bool,
}
