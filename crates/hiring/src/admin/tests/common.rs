use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::admin::{AdminCredentials, AdminService};
use crate::applications::{
    ApplicationId, ApplicationStore, CandidateApplication, NewApplication, RepositoryError,
};
use crate::config::ReportingConfig;

pub(super) const ADMIN_EMAIL: &str = "talento@dosmicos.co";
pub(super) const ADMIN_PASSWORD: &str = "s3creto-largo";

/// 10:30 in Bogotá.
pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 15, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn answers(full_name: &str, email: &str, university: &str) -> NewApplication {
    NewApplication {
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: "+57 300 000 0000".to_string(),
        university: university.to_string(),
        portfolio_link: None,
        resume_url: None,
        impressive_achievement: "Organicé un festival universitario con 3.000 asistentes.".to_string(),
        diagnostic_whats_working: "Las fotos de producto transmiten calidez.".to_string(),
        diagnostic_improvements: "Más testimonios en video.".to_string(),
        diagnostic_missed_opportunity: "Regalos para baby showers.".to_string(),
        campaign_name: "Primer abrazo".to_string(),
        campaign_concept: "La primera prenda que recuerdas.".to_string(),
        campaign_executions: "Serie de reels\nActivación en clínicas".to_string(),
        budget_challenge: "Todo a contenido creado por mamás.".to_string(),
    }
}

pub(super) fn application(
    id: &str,
    created_at: DateTime<Utc>,
    full_name: &str,
    email: &str,
    university: &str,
) -> CandidateApplication {
    CandidateApplication {
        id: ApplicationId(id.to_string()),
        created_at,
        answers: answers(full_name, email, university),
    }
}

/// Three applications, newest first.
pub(super) fn roster() -> Vec<CandidateApplication> {
    vec![
        application(
            "app-000003",
            now() - Duration::hours(1),
            "María Pérez",
            "maria.perez@uniandes.edu.co",
            "Universidad de los Andes",
        ),
        application(
            "app-000002",
            now() - Duration::days(3),
            "Juan Gómez",
            "juan@javeriana.edu.co",
            "Pontificia Universidad Javeriana",
        ),
        application(
            "app-000001",
            now() - Duration::days(10),
            "Laura Ríos",
            "laura.rios@gmail.com",
            "CESA",
        ),
    ]
}

#[derive(Default)]
pub(super) struct SeededStore {
    records: Mutex<Vec<CandidateApplication>>,
    offline: AtomicBool,
}

impl SeededStore {
    pub(super) fn with(records: Vec<CandidateApplication>) -> Self {
        Self {
            records: Mutex::new(records),
            offline: AtomicBool::new(false),
        }
    }

    pub(super) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable("database offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ApplicationStore for SeededStore {
    fn insert(&self, application: NewApplication) -> Result<CandidateApplication, RepositoryError> {
        self.check()?;
        let mut records = self.records.lock().expect("store mutex poisoned");
        let record = CandidateApplication {
            id: ApplicationId(format!("app-{:06}", records.len() + 1)),
            created_at: Utc::now(),
            answers: application,
        };
        records.insert(0, record.clone());
        Ok(record)
    }

    fn list_recent(&self) -> Result<Vec<CandidateApplication>, RepositoryError> {
        self.check()?;
        Ok(self.records.lock().expect("store mutex poisoned").clone())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<CandidateApplication>, RepositoryError> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .find(|record| &record.id == id)
            .cloned())
    }
}

pub(super) fn build_admin(
    records: Vec<CandidateApplication>,
) -> (AdminService<SeededStore>, Arc<SeededStore>) {
    let store = Arc::new(SeededStore::with(records));
    let service = AdminService::new(
        store.clone(),
        Some(AdminCredentials::from_password(ADMIN_EMAIL, ADMIN_PASSWORD)),
        ReportingConfig::default(),
    );
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
