pub mod layout;
mod render;

use chrono::FixedOffset;

use self::layout::{DocumentLayout, FontWeight, LayoutCursor, Tone};
use super::{format_timestamp, underscore_whitespace};
use crate::applications::CandidateApplication;

/// A rendered single-application report ready for download.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub file_name: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

pub fn pdf_file_name(full_name: &str) -> String {
    format!("aplicacion_{}.pdf", underscore_whitespace(full_name))
}

pub fn generate_pdf(application: &CandidateApplication, offset: FixedOffset) -> PdfDocument {
    let layout = application_layout(application, offset);
    let bytes = render::render(&layout, &format!("Aplicación de {}", application.full_name));
    PdfDocument {
        file_name: pdf_file_name(&application.full_name),
        page_count: layout.page_count(),
        bytes,
    }
}

/// Title block followed by one section per part of the application.
pub fn application_layout(application: &CandidateApplication, offset: FixedOffset) -> DocumentLayout {
    let mut cursor = LayoutCursor::new();

    cursor.heading("DOSMICOS HIRING", 20.0, Tone::Ink, FontWeight::Bold, 10.0);
    cursor.heading("Aplicación de candidato", 14.0, Tone::Muted, FontWeight::Regular, 15.0);

    cursor.section_title("Datos del candidato");
    let body = |label: &str, value: &str| format!("{label}: {value}");
    cursor.wrapped_text(&body("Nombre", &application.full_name), 11.0, FontWeight::Regular);
    cursor.wrapped_text(&body("Email", &application.email), 11.0, FontWeight::Regular);
    cursor.wrapped_text(&body("Teléfono", &application.phone), 11.0, FontWeight::Regular);
    cursor.wrapped_text(&body("Universidad", &application.university), 11.0, FontWeight::Regular);
    cursor.wrapped_text(
        &body(
            "Portafolio",
            application.portfolio_link.as_deref().unwrap_or("No proporcionado"),
        ),
        11.0,
        FontWeight::Regular,
    );
    let resume = if application.resume_url.is_some() {
        "Adjunta"
    } else {
        "No proporcionada"
    };
    cursor.wrapped_text(&body("Hoja de vida", resume), 11.0, FontWeight::Regular);
    cursor.wrapped_text(
        &body("Fecha", &format_timestamp(application.created_at, offset)),
        11.0,
        FontWeight::Regular,
    );

    if !application.impressive_achievement.trim().is_empty() {
        cursor.section_title("Logro más impresionante");
        cursor.wrapped_text(&application.impressive_achievement, 10.0, FontWeight::Regular);
    }

    cursor.section_title("Diagnóstico Rápido");
    let questions = [
        ("1. ¿Qué está funcionando bien?", &application.diagnostic_whats_working),
        ("2. ¿Qué mejorarías?", &application.diagnostic_improvements),
        (
            "3. ¿Qué oportunidad estamos dejando pasar?",
            &application.diagnostic_missed_opportunity,
        ),
    ];
    for (idx, (question, answer)) in questions.into_iter().enumerate() {
        if idx > 0 {
            cursor.gap(4.0);
        }
        cursor.wrapped_text(question, 11.0, FontWeight::Bold);
        cursor.wrapped_text(answer, 10.0, FontWeight::Regular);
    }

    cursor.section_title("Concepto de Campaña");
    cursor.wrapped_text(&body("Nombre", &application.campaign_name), 11.0, FontWeight::Bold);
    cursor.gap(2.0);
    cursor.wrapped_text("Concepto:", 11.0, FontWeight::Bold);
    cursor.wrapped_text(&application.campaign_concept, 10.0, FontWeight::Regular);
    cursor.gap(4.0);
    cursor.wrapped_text("Ejecuciones:", 11.0, FontWeight::Bold);
    cursor.wrapped_text(&application.campaign_executions, 10.0, FontWeight::Regular);

    cursor.section_title("Reto Final ($1M + 48h)");
    cursor.wrapped_text(&application.budget_challenge, 10.0, FontWeight::Regular);

    cursor.finish()
}
