//! Where the remnants come from: the supplier's published archive, or a local
//! spreadsheet for offline runs.

use std::io::{Cursor, Read};
use std::path::PathBuf;

use tracing::info;
use wsync_reconcile::RemnantRecord;

use crate::parse::{parse_workbook, DEFAULT_HEADER_ROW};
use crate::FeedError;

#[async_trait::async_trait]
pub trait RemnantsSource: Send + Sync {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    async fn fetch_remnants(&self) -> Result<Vec<RemnantRecord>, FeedError>;
}

// ---------------------------------------------------------------------------
// HTTP archive
// ---------------------------------------------------------------------------

/// ZIP archive published over HTTP with one spreadsheet inside.
///
/// The archive is unpacked in memory; nothing is written to disk.
#[derive(Debug, Clone)]
pub struct ArchiveFeed {
    url: String,
    header_row: usize,
    http: reqwest::Client,
}

impl ArchiveFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            header_row: DEFAULT_HEADER_ROW,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    async fn download(&self) -> Result<Vec<u8>, FeedError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Rejected {
                status: status.as_u16(),
                message: body.chars().take(512).collect(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl RemnantsSource for ArchiveFeed {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_remnants(&self) -> Result<Vec<RemnantRecord>, FeedError> {
        let archive = self.download().await?;
        let (name, sheet) = extract_spreadsheet(archive)?;
        let records = parse_workbook(sheet, self.header_row)?;
        info!(url = %self.url, entry = %name, records = records.len(), "remnants feed loaded");
        Ok(records)
    }
}

/// Pull the first `.xls`/`.xlsx` entry out of a ZIP archive.
///
/// Returns the entry name with its bytes.
pub fn extract_spreadsheet(archive: Vec<u8>) -> Result<(String, Vec<u8>), FeedError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if !entry.is_file() || !is_spreadsheet(entry.name()) {
            continue;
        }
        let name = entry.name().to_string();
        let mut buf = Vec::with_capacity(initial_capacity(entry.size()));
        entry.read_to_end(&mut buf)?;
        return Ok((name, buf));
    }
    Err(FeedError::Archive(
        "archive contains no .xls or .xlsx entry".to_string(),
    ))
}

/// Entry sizes come from the archive header and are not trusted beyond this.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

fn is_spreadsheet(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".xls") || lower.ends_with(".xlsx")
}

// ---------------------------------------------------------------------------
// Local file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SpreadsheetFile {
    path: PathBuf,
    header_row: usize,
}

impl SpreadsheetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header_row: DEFAULT_HEADER_ROW,
        }
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }
}

#[async_trait::async_trait]
impl RemnantsSource for SpreadsheetFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_remnants(&self) -> Result<Vec<RemnantRecord>, FeedError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FeedError::Io(format!("{}: {e}", self.path.display())))?;
        let records = parse_workbook(bytes, self.header_row)?;
        info!(path = %self.path.display(), records = records.len(), "remnants feed loaded");
        Ok(records)
    }
}
