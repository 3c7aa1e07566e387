use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::auth::{validate_admin, AdminCredentials, AdminSessions, AuthError, SessionToken};
use super::console::{ConsoleState, ConsoleStats, FetchOutcome};
use super::export::{csv_file_name, export_csv, generate_pdf, ExportError, PdfDocument};
use crate::applications::{ApplicationId, ApplicationStore, CandidateApplication, RepositoryError};
use crate::config::ReportingConfig;

/// What the console shows after a load: the filtered rows plus headline numbers.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleSnapshot {
    pub applications: Vec<CandidateApplication>,
    pub loaded: usize,
    pub stats: ConsoleStats,
    pub search_term: String,
    pub loading: bool,
}

impl ConsoleSnapshot {
    fn capture(console: &ConsoleState, now: DateTime<Utc>, reporting: ReportingConfig) -> Self {
        Self {
            applications: console.filtered().into_iter().cloned().collect(),
            loaded: console.applications().len(),
            stats: console.stats(now, reporting.utc_offset),
            search_term: console.search_term().to_string(),
            loading: console.is_loading(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub body: String,
}

/// Service behind the admin console: login gate, application list, and downloads.
pub struct AdminService<S> {
    store: Arc<S>,
    credentials: Option<AdminCredentials>,
    sessions: AdminSessions,
    reporting: ReportingConfig,
}

impl<S> AdminService<S>
where
    S: ApplicationStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        credentials: Option<AdminCredentials>,
        reporting: ReportingConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            sessions: AdminSessions::new(),
            reporting,
        }
    }

    pub fn reporting(&self) -> ReportingConfig {
        self.reporting
    }

    pub fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, AdminServiceError> {
        if self.credentials.is_none() {
            warn!("admin login attempted but ADMIN_EMAIL/ADMIN_PASSWORD_SHA256 are not configured");
            return Err(AuthError::InvalidCredentials.into());
        }
        if !validate_admin(self.credentials.as_ref(), email.trim(), password) {
            warn!(email = %email.trim(), "admin login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.sessions.open(email.trim(), now);
        info!(email = %email.trim(), "admin logged in");
        Ok(token)
    }

    pub fn logout(&self, token: &SessionToken) -> Result<(), AdminServiceError> {
        if self.sessions.close(token) {
            info!("admin logged out");
            Ok(())
        } else {
            Err(AuthError::UnknownSession.into())
        }
    }

    pub fn is_authenticated(&self, token: &SessionToken) -> bool {
        self.sessions.is_authenticated(token)
    }

    /// Session owner's email, if the token is live.
    pub fn session_email(&self, token: &SessionToken) -> Option<String> {
        self.sessions
            .with_session(token, |session| session.email.clone())
            .ok()
    }

    fn authorize(&self, token: &SessionToken) -> Result<(), AdminServiceError> {
        if self.sessions.is_authenticated(token) {
            Ok(())
        } else {
            Err(AuthError::UnknownSession.into())
        }
    }

    /// Refetch the list into the session's console and return the filtered view.
    ///
    /// The store is queried outside the session lock. A completion that lost the race
    /// to a newer fetch is dropped, and the snapshot reflects whichever list is current.
    pub fn load_applications(
        &self,
        token: &SessionToken,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ConsoleSnapshot, AdminServiceError> {
        let ticket = self.sessions.with_session(token, |session| {
            if let Some(term) = search {
                session.console.set_search_term(term);
            }
            session.console.begin_fetch()
        })?;

        let result = self.store.list_recent();

        let reporting = self.reporting;
        let snapshot = self.sessions.with_session(token, |session| {
            if session.console.complete_fetch(ticket, result) == FetchOutcome::Stale {
                warn!("application fetch completed after a newer one; result discarded");
            }
            ConsoleSnapshot::capture(&session.console, now, reporting)
        })?;
        Ok(snapshot)
    }

    pub fn application(
        &self,
        token: &SessionToken,
        id: &ApplicationId,
    ) -> Result<CandidateApplication, AdminServiceError> {
        self.authorize(token)?;
        self.store
            .fetch(id)?
            .ok_or(AdminServiceError::Repository(RepositoryError::NotFound))
    }

    /// Every stored application as CSV, named after today's UTC date.
    pub fn export_csv(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<CsvExport, AdminServiceError> {
        self.authorize(token)?;
        let applications = self.store.list_recent()?;
        let body = export_csv(&applications, self.reporting.utc_offset)?;
        info!(rows = applications.len(), "applications exported to CSV");
        Ok(CsvExport {
            file_name: csv_file_name(now.date_naive()),
            body,
        })
    }

    pub fn export_pdf(
        &self,
        token: &SessionToken,
        id: &ApplicationId,
    ) -> Result<PdfDocument, AdminServiceError> {
        let application = self.application(token, id)?;
        let document = generate_pdf(&application, self.reporting.utc_offset);
        info!(application_id = %id, pages = document.page_count, "application exported to PDF");
        Ok(document)
    }
}

/// Error raised by the admin service.
#[derive(Debug, thiserror::Error)]
pub enum AdminServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
