use std::path::Path;

use inspire::{
    api::{arxiv, literature, HttpClient},
    config::Settings,
    display::{self, DisplayMode},
    file::FormatFile,
    format::{BibTex, Reader, Writer},
    merge::{self, MergeMode, Summary},
    query::Query,
    record::Record,
    select,
};

use eyre::{Context, Result};
use log::{info, trace, warn};

use crate::interact::{progress_bar, spinner, TerminalSelector};

/// Everything a run needs: the settings and a client to talk to INSPIRE.
pub struct App {
    settings: Settings,
    client: HttpClient,
    quiet: bool,
}

impl App {
    pub fn new(settings: Settings, quiet: bool) -> Result<Self> {
        let client = HttpClient::new(&settings)?;
        Ok(Self {
            settings,
            client,
            quiet,
        })
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs `query` and lets the user choose among the records found.
    pub fn search_and_select(&self, query: &Query) -> Result<Vec<Record>> {
        let request = query.request(&self.settings.api_url);

        let progress = spinner("Searching INSPIRE...", self.quiet)?;
        let result = literature::search(&self.client, &request);
        progress.finish_and_clear();
        let result = result.wrap_err_with(|| format!("Searching for '{}' failed", query.text()))?;

        info!(
            "total: {}; retrieved: {}",
            result.total,
            result.records.len()
        );
        if result.records.is_empty() {
            println!("No records found for '{}'", query.text());
            return Ok(Vec::new());
        }

        let mut selector = TerminalSelector::new(self.settings.page_size);
        let selection = select::select_records(&mut selector, &result, self.settings.max_authors)?;
        if selection.is_empty() {
            info!("Nothing selected");
        }

        Ok(selection.retain(result.records))
    }

    /// Prints `records` to stdout, fetching the rendering from INSPIRE when it is not local.
    pub fn display(&self, records: &[Record], mode: DisplayMode) -> Result<()> {
        if let Some(rendered) = display::render(records, mode) {
            println!("{rendered}");
            return Ok(());
        }

        let link = mode.link_name().unwrap_or(mode.as_str());
        for record in records {
            let progress = spinner(&format!("Fetching {link} for {}...", record.key), self.quiet)?;
            let rendered = literature::fetch_link(&self.client, record, link);
            progress.finish_and_clear();
            let rendered = rendered.wrap_err_with(|| format!("Cannot display '{}'", record.key))?;
            println!("{}", rendered.trim_end());
        }

        Ok(())
    }

    /// Merges into the bibliography at `path`, writing it back only when it changed.
    ///
    /// `records` are appended in [`MergeMode::Append`] and ignored in [`MergeMode::Update`].
    pub fn merge(&self, path: &Path, mode: MergeMode, records: Vec<Record>) -> Result<Summary> {
        let mut file = FormatFile::<BibTex>::new(path);
        let mut biblio = file
            .read_ast()
            .wrap_err_with(|| format!("Cannot load '{}'", path.display()))?;
        trace!("Read {} entries from '{}'", biblio.len(), file.path().display());

        let summary = match mode {
            MergeMode::Append => merge::append(&mut biblio, records),
            MergeMode::Update => {
                let bar = progress_bar(biblio.len() as u64, self.quiet)?;
                let summary =
                    merge::update(&mut biblio, &self.client, &self.settings.api_url, |key| {
                        bar.set_message(key.to_owned());
                        bar.inc(1);
                    });
                bar.finish_and_clear();
                summary.wrap_err("Updating from INSPIRE failed - the bibliography was not written")?
            }
        };

        if biblio.dirty() {
            trace!("Updating the bibliography file..");
            file.write_ast(&biblio)
                .wrap_err_with(|| format!("Cannot save '{}'", file.path().display()))?;
        } else {
            trace!("Bibliography unchanged - nothing to write");
        }

        Ok(summary)
    }

    /// Downloads the arXiv PDF of each record, reporting failures without stopping.
    pub fn download_pdfs(&self, records: &[Record]) -> Result<()> {
        for record in records {
            let progress = spinner(&format!("Downloading PDF for {}...", record.key), self.quiet)?;
            let saved = arxiv::download_pdf(&self.client, record, &self.settings.pdf_dir);
            progress.finish_and_clear();

            match saved {
                Ok(path) => println!("Saved {}", path.display()),
                Err(err) => warn!("{err}"),
            }
        }

        Ok(())
    }
}
