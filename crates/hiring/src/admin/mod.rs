//! Admin console: credential gate, application list with search and stats, and the
//! CSV/PDF downloads.

pub mod auth;
pub mod console;
pub mod export;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use auth::{
    hash_password, validate_admin, AdminCredentials, AdminSession, AdminSessions, AuthError,
    SessionToken,
};
pub use console::{search, stats, ConsoleState, ConsoleStats, FetchOutcome, FetchTicket};
pub use export::{
    csv_file_name, export_csv, generate_pdf, pdf_file_name, ExportError, PdfDocument, CSV_HEADERS,
};
pub use router::admin_router;
pub use service::{AdminService, AdminServiceError, ConsoleSnapshot, CsvExport};
