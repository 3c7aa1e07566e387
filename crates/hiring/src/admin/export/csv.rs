use chrono::{FixedOffset, NaiveDate};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::{format_timestamp, ExportError};
use crate::applications::CandidateApplication;

pub const CSV_HEADERS: [&str; 13] = [
    "Nombre",
    "Email",
    "Teléfono",
    "Universidad",
    "Portafolio",
    "Fecha",
    "Qué funciona",
    "Qué mejorar",
    "Oportunidad",
    "Nombre campaña",
    "Concepto",
    "Ejecuciones",
    "Reto $1M",
];

/// Every field quoted, embedded quotes doubled, one row per application.
pub fn export_csv(
    applications: &[CandidateApplication],
    offset: FixedOffset,
) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for application in applications {
        let created = format_timestamp(application.created_at, offset);
        writer.write_record([
            application.full_name.as_str(),
            application.email.as_str(),
            application.phone.as_str(),
            application.university.as_str(),
            application.portfolio_link.as_deref().unwrap_or(""),
            created.as_str(),
            application.diagnostic_whats_working.as_str(),
            application.diagnostic_improvements.as_str(),
            application.diagnostic_missed_opportunity.as_str(),
            application.campaign_name.as_str(),
            application.campaign_concept.as_str(),
            application.campaign_executions.as_str(),
            application.budget_challenge.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn csv_file_name(date: NaiveDate) -> String {
    format!("aplicaciones_dosmicos_{}.csv", date.format("%Y-%m-%d"))
}
