use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::applications::domain::{
    ApplicationDraft, ApplicationField, ApplicationId, CandidateApplication, NewApplication,
};
use crate::applications::repository::{
    ApplicationStore, RepositoryError, ResumeStorage, StorageError, StoredObject,
};
use crate::applications::wizard::WizardStep;
use crate::applications::{application_router, ApplicationService};

pub(super) const RESUME_BASE_URL: &str = "https://files.dosmicos.test/resumes";

/// Edits that satisfy every rule of `step`.
pub(super) fn step_edits(step: WizardStep) -> BTreeMap<ApplicationField, String> {
    let values: &[(ApplicationField, &str)] = match step {
        WizardStep::Identity => &[
            (ApplicationField::FullName, "María Pérez"),
            (ApplicationField::Email, "maria.perez@uniandes.edu.co"),
            (ApplicationField::Phone, "+57 300 123 4567"),
            (ApplicationField::University, "Universidad de los Andes"),
            (ApplicationField::PortfolioLink, "https://behance.net/mariaperez"),
            (
                ApplicationField::ImpressiveAchievement,
                "Lancé una marca de ropa infantil que vendió 2.000 unidades en 3 meses.",
            ),
        ],
        WizardStep::Diagnostic => &[
            (
                ApplicationField::DiagnosticWhatsWorking,
                "El contenido con mamás reales genera confianza.",
            ),
            (
                ApplicationField::DiagnosticImprovements,
                "Publicaría con más frecuencia en TikTok.",
            ),
            (
                ApplicationField::DiagnosticMissedOpportunity,
                "Alianzas con pediatras y jardines infantiles.",
            ),
        ],
        WizardStep::Campaign => &[
            (ApplicationField::CampaignName, "Abrazos que abrigan"),
            (
                ApplicationField::CampaignConcept,
                "Cada prenda cuenta la historia de una familia.",
            ),
            (
                ApplicationField::CampaignExecutions,
                "1. Serie de TikTok\n2. Pop-up en Unicentro\n3. Influencers de crianza",
            ),
        ],
        WizardStep::Challenge => &[(
            ApplicationField::BudgetChallenge,
            "40% pauta digital, 30% contenido, 20% eventos, 10% reserva.",
        )],
    };

    values
        .iter()
        .map(|(field, value)| (*field, value.to_string()))
        .collect()
}

pub(super) fn complete_draft() -> ApplicationDraft {
    let mut draft = ApplicationDraft::default();
    for step in WizardStep::ALL {
        for (field, value) in step_edits(step) {
            draft.set(field, value);
        }
    }
    draft
}

pub(super) fn build_service() -> (
    ApplicationService<MemoryStore, MemoryResumes>,
    Arc<MemoryStore>,
    Arc<MemoryResumes>,
) {
    let store = Arc::new(MemoryStore::default());
    let resumes = Arc::new(MemoryResumes::default());
    let service = ApplicationService::new(store.clone(), resumes.clone());
    (service, store, resumes)
}

pub(super) fn application_router_with_service<S, R>(service: ApplicationService<S, R>) -> axum::Router
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    application_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<Vec<CandidateApplication>>,
    sequence: AtomicUsize,
}

impl MemoryStore {
    pub(super) fn records(&self) -> Vec<CandidateApplication> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl ApplicationStore for MemoryStore {
    fn insert(&self, application: NewApplication) -> Result<CandidateApplication, RepositoryError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let record = CandidateApplication {
            id: ApplicationId(format!("app-{next:06}")),
            created_at: Utc::now(),
            answers: application,
        };
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn list_recent(&self) -> Result<Vec<CandidateApplication>, RepositoryError> {
        let mut records = self.records();
        records.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(records)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<CandidateApplication>, RepositoryError> {
        Ok(self.records().into_iter().find(|record| &record.id == id))
    }
}

/// Fails the first `failures` inserts, then behaves like [`MemoryStore`].
pub(super) struct FlakyStore {
    failures: AtomicUsize,
    pub(super) inner: MemoryStore,
}

impl FlakyStore {
    pub(super) fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            inner: MemoryStore::default(),
        }
    }
}

impl ApplicationStore for FlakyStore {
    fn insert(&self, application: NewApplication) -> Result<CandidateApplication, RepositoryError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.inner.insert(application)
    }

    fn list_recent(&self) -> Result<Vec<CandidateApplication>, RepositoryError> {
        self.inner.list_recent()
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<CandidateApplication>, RepositoryError> {
        self.inner.fetch(id)
    }
}

#[derive(Default)]
pub(super) struct MemoryResumes {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryResumes {
    pub(super) fn object_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .objects
            .lock()
            .expect("resume mutex poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl ResumeStorage for MemoryResumes {
    fn upload(&self, object_name: &str, content_type: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let mut objects = self.objects.lock().expect("resume mutex poisoned");
        if objects.contains_key(object_name) {
            return Err(StorageError::AlreadyExists(object_name.to_string()));
        }
        objects.insert(
            object_name.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes: bytes.to_vec(),
            },
        );
        Ok(format!("{RESUME_BASE_URL}/{object_name}"))
    }

    fn open(&self, object_name: &str) -> Result<Option<StoredObject>, StorageError> {
        Ok(self
            .objects
            .lock()
            .expect("resume mutex poisoned")
            .get(object_name)
            .cloned())
    }

    fn remove(&self, object_name: &str) -> Result<(), StorageError> {
        self.objects
            .lock()
            .expect("resume mutex poisoned")
            .remove(object_name);
        Ok(())
    }
}

pub(super) struct UnavailableResumes;

impl ResumeStorage for UnavailableResumes {
    fn upload(&self, _object_name: &str, _content_type: &str, _bytes: &[u8]) -> Result<String, StorageError> {
        Err(StorageError::Unavailable("bucket offline".to_string()))
    }

    fn open(&self, _object_name: &str) -> Result<Option<StoredObject>, StorageError> {
        Err(StorageError::Unavailable("bucket offline".to_string()))
    }

    fn remove(&self, _object_name: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("bucket offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
