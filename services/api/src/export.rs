use crate::infra::ConfiguredStore;
use chrono::Utc;
use clap::Args;
use dosmicos_hiring::admin::{csv_file_name, export_csv, generate_pdf, hash_password};
use dosmicos_hiring::applications::{ApplicationId, ApplicationStore, RepositoryError};
use dosmicos_hiring::config::AppConfig;
use dosmicos_hiring::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct CsvExportArgs {
    /// Destination file (defaults to aplicaciones_dosmicos_<date>.csv in the working directory)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PdfExportArgs {
    /// Application id, e.g. app-000001
    #[arg(long)]
    pub(crate) id: String,
    /// Destination file (defaults to aplicacion_<name>.pdf in the working directory)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct HashPasswordArgs {
    /// Plain-text password to digest
    pub(crate) password: String,
}

pub(crate) fn run_csv_export(args: CsvExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = ConfiguredStore::open(&config.storage)?;

    let applications = store.list_recent()?;
    let body = export_csv(&applications, config.reporting.utc_offset)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(csv_file_name(Utc::now().date_naive())));
    write_output(&output, body.as_bytes())?;

    println!(
        "Exported {} application(s) to {}",
        applications.len(),
        output.display()
    );
    Ok(())
}

pub(crate) fn run_pdf_export(args: PdfExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = ConfiguredStore::open(&config.storage)?;

    let id = ApplicationId(args.id.trim().to_string());
    let application = store.fetch(&id)?.ok_or(RepositoryError::NotFound)?;
    let document = generate_pdf(&application, config.reporting.utc_offset);
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&document.file_name));
    write_output(&output, &document.bytes)?;

    println!(
        "Exported {} ({} page(s)) to {}",
        application.id,
        document.page_count,
        output.display()
    );
    Ok(())
}

pub(crate) fn run_hash_password(args: HashPasswordArgs) -> Result<(), AppError> {
    println!("{}", hash_password(&args.password));
    Ok(())
}

pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
