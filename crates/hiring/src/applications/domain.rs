use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Universities offered in the identity step. `Otra` covers everyone else.
pub const UNIVERSITIES: [&str; 11] = [
    "Universidad Jorge Tadeo Lozano",
    "Universidad de los Andes",
    "Pontificia Universidad Javeriana",
    "Universidad Nacional de Colombia",
    "Universidad del Rosario",
    "Universidad Externado de Colombia",
    "Universidad de La Sabana",
    "Universidad EAN",
    "Politécnico Grancolombiano",
    "CESA",
    "Otra",
];

/// Character ceiling for the long-form answers that carry one.
pub const LONG_ANSWER_LIMIT: usize = 500;

/// One persisted candidate application. Immutable once the store has created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateApplication {
    pub id: ApplicationId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub answers: NewApplication,
}

impl std::ops::Deref for CandidateApplication {
    type Target = NewApplication;

    fn deref(&self) -> &Self::Target {
        &self.answers
    }
}

/// A fully validated submission waiting for the store to assign `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub university: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    pub impressive_achievement: String,
    pub diagnostic_whats_working: String,
    pub diagnostic_improvements: String,
    pub diagnostic_missed_opportunity: String,
    pub campaign_name: String,
    pub campaign_concept: String,
    pub campaign_executions: String,
    pub budget_challenge: String,
}

/// Every editable field of the wizard, keyed by its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationField {
    FullName,
    Email,
    Phone,
    University,
    PortfolioLink,
    ResumeUrl,
    ImpressiveAchievement,
    DiagnosticWhatsWorking,
    DiagnosticImprovements,
    DiagnosticMissedOpportunity,
    CampaignName,
    CampaignConcept,
    CampaignExecutions,
    BudgetChallenge,
}

impl ApplicationField {
    pub const ALL: [ApplicationField; 14] = [
        ApplicationField::FullName,
        ApplicationField::Email,
        ApplicationField::Phone,
        ApplicationField::University,
        ApplicationField::PortfolioLink,
        ApplicationField::ResumeUrl,
        ApplicationField::ImpressiveAchievement,
        ApplicationField::DiagnosticWhatsWorking,
        ApplicationField::DiagnosticImprovements,
        ApplicationField::DiagnosticMissedOpportunity,
        ApplicationField::CampaignName,
        ApplicationField::CampaignConcept,
        ApplicationField::CampaignExecutions,
        ApplicationField::BudgetChallenge,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ApplicationField::FullName => "full_name",
            ApplicationField::Email => "email",
            ApplicationField::Phone => "phone",
            ApplicationField::University => "university",
            ApplicationField::PortfolioLink => "portfolio_link",
            ApplicationField::ResumeUrl => "resume_url",
            ApplicationField::ImpressiveAchievement => "impressive_achievement",
            ApplicationField::DiagnosticWhatsWorking => "diagnostic_whats_working",
            ApplicationField::DiagnosticImprovements => "diagnostic_improvements",
            ApplicationField::DiagnosticMissedOpportunity => "diagnostic_missed_opportunity",
            ApplicationField::CampaignName => "campaign_name",
            ApplicationField::CampaignConcept => "campaign_concept",
            ApplicationField::CampaignExecutions => "campaign_executions",
            ApplicationField::BudgetChallenge => "budget_challenge",
        }
    }

    /// Fields whose length is capped at [`LONG_ANSWER_LIMIT`].
    pub const fn char_limit(self) -> Option<usize> {
        match self {
            ApplicationField::ImpressiveAchievement
            | ApplicationField::DiagnosticWhatsWorking
            | ApplicationField::DiagnosticImprovements
            | ApplicationField::DiagnosticMissedOpportunity => Some(LONG_ANSWER_LIMIT),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// In-progress field values as typed by the candidate. Blank strings mean "not filled".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub university: String,
    pub portfolio_link: String,
    pub resume_url: String,
    pub impressive_achievement: String,
    pub diagnostic_whats_working: String,
    pub diagnostic_improvements: String,
    pub diagnostic_missed_opportunity: String,
    pub campaign_name: String,
    pub campaign_concept: String,
    pub campaign_executions: String,
    pub budget_challenge: String,
}

impl ApplicationDraft {
    pub fn get(&self, field: ApplicationField) -> &str {
        match field {
            ApplicationField::FullName => &self.full_name,
            ApplicationField::Email => &self.email,
            ApplicationField::Phone => &self.phone,
            ApplicationField::University => &self.university,
            ApplicationField::PortfolioLink => &self.portfolio_link,
            ApplicationField::ResumeUrl => &self.resume_url,
            ApplicationField::ImpressiveAchievement => &self.impressive_achievement,
            ApplicationField::DiagnosticWhatsWorking => &self.diagnostic_whats_working,
            ApplicationField::DiagnosticImprovements => &self.diagnostic_improvements,
            ApplicationField::DiagnosticMissedOpportunity => &self.diagnostic_missed_opportunity,
            ApplicationField::CampaignName => &self.campaign_name,
            ApplicationField::CampaignConcept => &self.campaign_concept,
            ApplicationField::CampaignExecutions => &self.campaign_executions,
            ApplicationField::BudgetChallenge => &self.budget_challenge,
        }
    }

    pub fn set(&mut self, field: ApplicationField, value: String) {
        let slot = match field {
            ApplicationField::FullName => &mut self.full_name,
            ApplicationField::Email => &mut self.email,
            ApplicationField::Phone => &mut self.phone,
            ApplicationField::University => &mut self.university,
            ApplicationField::PortfolioLink => &mut self.portfolio_link,
            ApplicationField::ResumeUrl => &mut self.resume_url,
            ApplicationField::ImpressiveAchievement => &mut self.impressive_achievement,
            ApplicationField::DiagnosticWhatsWorking => &mut self.diagnostic_whats_working,
            ApplicationField::DiagnosticImprovements => &mut self.diagnostic_improvements,
            ApplicationField::DiagnosticMissedOpportunity => {
                &mut self.diagnostic_missed_opportunity
            }
            ApplicationField::CampaignName => &mut self.campaign_name,
            ApplicationField::CampaignConcept => &mut self.campaign_concept,
            ApplicationField::CampaignExecutions => &mut self.campaign_executions,
            ApplicationField::BudgetChallenge => &mut self.budget_challenge,
        };
        *slot = value;
    }

    /// Freeze the draft into a submission. Callers validate first.
    pub(crate) fn to_new_application(&self) -> NewApplication {
        NewApplication {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            university: self.university.clone(),
            portfolio_link: non_blank(&self.portfolio_link),
            resume_url: non_blank(&self.resume_url),
            impressive_achievement: self.impressive_achievement.clone(),
            diagnostic_whats_working: self.diagnostic_whats_working.clone(),
            diagnostic_improvements: self.diagnostic_improvements.clone(),
            diagnostic_missed_opportunity: self.diagnostic_missed_opportunity.clone(),
            campaign_name: self.campaign_name.clone(),
            campaign_concept: self.campaign_concept.clone(),
            campaign_executions: self.campaign_executions.clone(),
            budget_challenge: self.budget_challenge.clone(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
