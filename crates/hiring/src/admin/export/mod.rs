//! Downloadable renditions of stored applications.

pub mod csv;
pub mod pdf;

use chrono::{DateTime, FixedOffset, Utc};

pub use self::csv::{csv_file_name, export_csv, CSV_HEADERS};
pub use self::pdf::{generate_pdf, pdf_file_name, PdfDocument};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Flush(String),
    #[error("CSV output was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Timestamp rendering shared by the CSV `Fecha` column and the PDF header block.
pub(crate) fn format_timestamp(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
}

/// Collapse each whitespace run into a single `_`.
pub(crate) fn underscore_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("_")
}
