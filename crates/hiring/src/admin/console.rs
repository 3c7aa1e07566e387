use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Serialize;
use tracing::{debug, error};

use crate::applications::{CandidateApplication, RepositoryError};

/// Numbered handle for one list fetch; only the newest completion is ever applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The fetch failed; the list was emptied.
    Failed,
    /// A newer fetch already landed, so this result was dropped.
    Stale,
}

/// Headline numbers shown above the application table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsoleStats {
    pub total: usize,
    pub last_seven_days: usize,
    pub today: usize,
}

/// The admin's view of the application list.
#[derive(Debug, Clone)]
pub struct ConsoleState {
    applications: Vec<CandidateApplication>,
    loading: bool,
    search_term: String,
    issued: u64,
    applied: u64,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleState {
    pub fn new() -> Self {
        Self {
            applications: Vec::new(),
            loading: true,
            search_term: String::new(),
            issued: 0,
            applied: 0,
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket(self.issued)
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<CandidateApplication>, RepositoryError>,
    ) -> FetchOutcome {
        if ticket.0 <= self.applied {
            debug!(ticket = ticket.0, applied = self.applied, "dropping stale application fetch");
            return FetchOutcome::Stale;
        }
        self.applied = ticket.0;
        if self.applied >= self.issued {
            self.loading = false;
        }

        match result {
            Ok(applications) => {
                self.applications = applications;
                FetchOutcome::Applied
            }
            Err(err) => {
                error!(error = %err, "error loading applications");
                self.applications.clear();
                FetchOutcome::Failed
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn applications(&self) -> &[CandidateApplication] {
        &self.applications
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn filtered(&self) -> Vec<&CandidateApplication> {
        search(&self.applications, &self.search_term)
    }

    pub fn stats(&self, now: DateTime<Utc>, offset: FixedOffset) -> ConsoleStats {
        stats(&self.applications, now, offset)
    }
}

/// Case-insensitive substring match on name, email, or university. A blank term matches all.
pub fn search<'a>(applications: &'a [CandidateApplication], term: &str) -> Vec<&'a CandidateApplication> {
    let needle = term.to_lowercase();
    applications
        .iter()
        .filter(|application| {
            needle.is_empty()
                || application.full_name.to_lowercase().contains(&needle)
                || application.email.to_lowercase().contains(&needle)
                || application.university.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Recomputed on every call; the list is small.
pub fn stats(
    applications: &[CandidateApplication],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> ConsoleStats {
    let week_ago = now - Duration::days(7);
    let today = now.with_timezone(&offset).date_naive();

    ConsoleStats {
        total: applications.len(),
        last_seven_days: applications
            .iter()
            .filter(|application| application.created_at > week_ago)
            .count(),
        today: applications
            .iter()
            .filter(|application| application.created_at.with_timezone(&offset).date_naive() == today)
            .count(),
    }
}
