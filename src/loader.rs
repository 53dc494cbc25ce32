//! Data loader: fetch the spreadsheet asset once, decode the first sheet into
//! [`RawRow`]s and publish the result.
//!
//! ### Notes
//! - Sources are local paths or `http(s)://` URLs (blocking reqwest client).
//! - XLSX/XLS/ODS are sniffed from their magic bytes and decoded with calamine;
//!   everything else is read as CSV with the `csv` crate.
//! - Only the first sheet is read and only its first three columns are kept.
//! - Failures are reported as [`LoadError`]; [`load_or_empty`] implements the
//!   "log and degrade to empty" policy used by the viewers.
//!
//! Typical usage:
//! ```no_run
//! # use popbars::loader::{self, LoadOptions, Source};
//! let rows = loader::load(&Source::parse("assets/data.csv"), &LoadOptions::default())?;
//! println!("{} rows", rows.len());
//! # Ok::<(), popbars::loader::LoadError>(())
//! ```
use crate::models::{Cell, RawRow};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::{debug, error, info};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use thiserror::Error;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header token in the year column.
pub const HEADER_YEAR_TOKEN: &str = "Year";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("failed to decode CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to decode spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("spreadsheet has no sheets")]
    NoSheets,
}

/// Where the asset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// `http://` and `https://` prefixes select a URL, anything else is a path.
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        let lower = t.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(t.to_string())
        } else {
            Source::Path(PathBuf::from(t))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Source::Path(p) => p.display().to_string(),
            Source::Url(u) => u.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Drop row 0 when its year cell is the literal `Year`.
    pub skip_header: bool,
}

/// Retrieve the raw bytes of the asset.
pub fn fetch_bytes(source: &Source) -> Result<Vec<u8>, LoadError> {
    match source {
        Source::Path(path) => std::fs::read(path).map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        }),
        Source::Url(url) => {
            let http = HttpClient::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .redirect(Policy::limited(5))
                .user_agent(concat!("popbars/", env!("CARGO_PKG_VERSION")))
                .build()?;
            let resp = http.get(url).send()?;
            let status = resp.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    status: status.as_u16(),
                    url: url.clone(),
                });
            }
            Ok(resp.bytes()?.to_vec())
        }
    }
}

/// Decode the first sheet of a workbook (or a CSV file) into rows.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<RawRow>, LoadError> {
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        decode_workbook(bytes)
    } else {
        decode_csv(bytes)
    }
}

fn decode_workbook(bytes: &[u8]) -> Result<Vec<RawRow>, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoSheets)??;
    Ok(range
        .rows()
        .map(|row| RawRow::from_cells(row.iter().take(3).map(data_to_cell)))
        .collect())
}

fn data_to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Vec<RawRow>, LoadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(RawRow::from_cells(record.iter().take(3).map(Cell::from_field)));
    }
    Ok(rows)
}

/// Fetch and decode. Errors are returned to the caller.
pub fn load(source: &Source, opts: &LoadOptions) -> Result<Vec<RawRow>, LoadError> {
    let bytes = fetch_bytes(source)?;
    let mut rows = decode_rows(&bytes)?;
    if opts.skip_header
        && rows
            .first()
            .is_some_and(|r| r.year.is_text(HEADER_YEAR_TOKEN))
    {
        rows.remove(0);
    }
    info!("loaded {} rows from {}", rows.len(), source.describe());
    Ok(rows)
}

/// Fetch and decode; a failure is logged and yields no rows.
pub fn load_or_empty(source: &Source, opts: &LoadOptions) -> Vec<RawRow> {
    match load(source, opts) {
        Ok(rows) => rows,
        Err(err) => {
            error!("error reading data from {}: {}", source.describe(), err);
            Vec::new()
        }
    }
}

/// Start loading on a background thread.
pub fn spawn_load(source: Source, opts: LoadOptions) -> LoadHandle {
    spawn_load_then(source, opts, || {})
}

/// Like [`spawn_load`], calling `on_ready` after the rows were published
/// (e.g. to wake a UI event loop).
pub fn spawn_load_then<F>(source: Source, opts: LoadOptions, on_ready: F) -> LoadHandle
where
    F: FnOnce() + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let alive = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&alive);

    thread::spawn(move || {
        let rows = load_or_empty(&source, &opts);
        if !flag.load(Ordering::Acquire) {
            debug!("load of {} finished after teardown, discarded", source.describe());
            return;
        }
        if sender.send(rows).is_ok() {
            on_ready();
        }
    });

    LoadHandle {
        receiver,
        alive,
        published: false,
    }
}

/// Handle to an in-flight load. The result is published at most once.
///
/// Dropping the handle (or calling [`LoadHandle::cancel`]) marks it dead;
/// rows arriving afterwards are never handed out.
#[derive(Debug)]
pub struct LoadHandle {
    receiver: Receiver<Vec<RawRow>>,
    alive: Arc<AtomicBool>,
    published: bool,
}

impl LoadHandle {
    /// Non-blocking poll.
    pub fn try_take(&mut self) -> Option<Vec<RawRow>> {
        if self.published || self.is_cancelled() {
            return None;
        }
        let rows = self.receiver.try_recv().ok()?;
        self.published = true;
        Some(rows)
    }

    /// Block until the load finishes. `None` once cancelled or already taken.
    pub fn wait(&mut self) -> Option<Vec<RawRow>> {
        if self.published || self.is_cancelled() {
            return None;
        }
        let rows = self.receiver.recv().ok()?;
        if self.is_cancelled() {
            return None;
        }
        self.published = true;
        Some(rows)
    }

    pub fn cancel(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        !self.alive.load(Ordering::Acquire)
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
