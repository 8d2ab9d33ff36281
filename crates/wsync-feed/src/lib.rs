//! wsync-feed
//!
//! Remnants feed ingestion: the supplier publishes a zipped spreadsheet whose
//! header sits a fixed number of rows down the first sheet. This crate turns
//! it into `RemnantRecord`s; everything downstream works on that list.

mod error;
pub mod parse;
pub mod source;

pub use error::FeedError;
pub use parse::{
    parse_grid, parse_workbook, CODE_COLUMN, DEFAULT_HEADER_ROW, PRICE_COLUMN, QUANTITY_COLUMN,
};
pub use source::{extract_spreadsheet, ArchiveFeed, RemnantsSource, SpreadsheetFile};
