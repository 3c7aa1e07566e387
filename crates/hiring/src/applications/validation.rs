use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{ApplicationDraft, ApplicationField, UNIVERSITIES};
use super::wizard::WizardStep;

/// Field name to user-facing message. Only failing fields appear.
pub type FieldErrors = BTreeMap<ApplicationField, String>;

const REQUIRED: &str = "Este campo es requerido";
const TOO_LONG: &str = "Máximo 500 caracteres";

/// Validation failure for a whole submission, carrying every failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("submission has {} invalid field(s)", .errors.len())]
pub struct ValidationErrors {
    pub errors: FieldErrors,
}

/// Run the rules of a single wizard step against the draft.
pub fn validate_step(step: WizardStep, draft: &ApplicationDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match step {
        WizardStep::Identity => {
            require(&mut errors, draft, ApplicationField::FullName, "El nombre es requerido");
            if draft.email.trim().is_empty() {
                errors.insert(ApplicationField::Email, "El correo es requerido".to_string());
            } else if !is_valid_email(&draft.email) {
                errors.insert(ApplicationField::Email, "Ingresa un correo válido".to_string());
            }
            require(&mut errors, draft, ApplicationField::Phone, "El teléfono es requerido");
            if !UNIVERSITIES.contains(&draft.university.as_str()) {
                errors.insert(
                    ApplicationField::University,
                    "Selecciona tu universidad".to_string(),
                );
            }
            require_limited(&mut errors, draft, ApplicationField::ImpressiveAchievement);
        }
        WizardStep::Diagnostic => {
            require_limited(&mut errors, draft, ApplicationField::DiagnosticWhatsWorking);
            require_limited(&mut errors, draft, ApplicationField::DiagnosticImprovements);
            require_limited(&mut errors, draft, ApplicationField::DiagnosticMissedOpportunity);
        }
        WizardStep::Campaign => {
            require(
                &mut errors,
                draft,
                ApplicationField::CampaignName,
                "El nombre de la campaña es requerido",
            );
            require(
                &mut errors,
                draft,
                ApplicationField::CampaignConcept,
                "El concepto es requerido",
            );
            require(
                &mut errors,
                draft,
                ApplicationField::CampaignExecutions,
                "Las ejecuciones son requeridas",
            );
        }
        WizardStep::Challenge => {
            require(
                &mut errors,
                draft,
                ApplicationField::BudgetChallenge,
                "Tu respuesta es requerida",
            );
        }
    }

    errors
}

/// Validate every step in order, merging the failures.
pub fn validate_all(draft: &ApplicationDraft) -> Result<(), ValidationErrors> {
    let errors: FieldErrors = WizardStep::ALL
        .into_iter()
        .flat_map(|step| validate_step(step, draft))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

/// Accepts `local@domain.tld`: no whitespace, a single `@`, and a dot inside the domain.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > 0 && idx + 1 < domain.len())
}

fn require(
    errors: &mut FieldErrors,
    draft: &ApplicationDraft,
    field: ApplicationField,
    message: &str,
) {
    if draft.get(field).trim().is_empty() {
        errors.insert(field, message.to_string());
    }
}

fn require_limited(errors: &mut FieldErrors, draft: &ApplicationDraft, field: ApplicationField) {
    let value = draft.get(field);
    if value.trim().is_empty() {
        errors.insert(field, REQUIRED.to_string());
    } else if let Some(limit) = field.char_limit() {
        if value.chars().count() > limit {
            errors.insert(field, TOO_LONG.to_string());
        }
    }
}
