use std::fmt;

#[derive(Debug)]
pub enum FeedError {
    /// Download failed before an HTTP status was received.
    Transport(String),
    /// Feed host answered with a non-success status.
    Rejected { status: u16, message: String },
    /// Archive unreadable or holds no spreadsheet.
    Archive(String),
    /// Workbook unreadable or has no sheets.
    Spreadsheet(String),
    /// Header row lacks a required column.
    MissingColumn { column: &'static str, header_row: usize },
    Io(String),
}

impl FeedError {
    pub fn class(&self) -> &'static str {
        match self {
            FeedError::Transport(_) => "transient_network",
            FeedError::Rejected { .. } => "remote_rejection",
            FeedError::Archive(_) | FeedError::Spreadsheet(_) | FeedError::MissingColumn { .. } => {
                "data_shape"
            }
            FeedError::Io(_) => "io",
        }
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Transport(m) => write!(f, "feed download failed: {m}"),
            FeedError::Rejected { status, message } => {
                write!(f, "feed host returned HTTP {status}: {message}")
            }
            FeedError::Archive(m) => write!(f, "feed archive: {m}"),
            FeedError::Spreadsheet(m) => write!(f, "feed spreadsheet: {m}"),
            FeedError::MissingColumn { column, header_row } => {
                write!(f, "feed header row {header_row} has no '{column}' column")
            }
            FeedError::Io(m) => write!(f, "feed io: {m}"),
        }
    }
}

impl std::error::Error for FeedError {}

impl From<zip::result::ZipError> for FeedError {
    fn from(e: zip::result::ZipError) -> Self {
        FeedError::Archive(e.to_string())
    }
}

impl From<calamine::Error> for FeedError {
    fn from(e: calamine::Error) -> Self {
        FeedError::Spreadsheet(e.to_string())
    }
}

impl From<std::io::Error> for FeedError {
    fn from(e: std::io::Error) -> Self {
        FeedError::Io(e.to_string())
    }
}
