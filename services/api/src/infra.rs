use chrono::Utc;
use dosmicos_hiring::applications::{
    ApplicationId, ApplicationStore, CandidateApplication, NewApplication, RepositoryError,
    ResumeStorage, StorageError, StoredObject,
};
use dosmicos_hiring::config::{StorageConfig, StoreBackend};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
}

fn next_id(records: &[CandidateApplication]) -> ApplicationId {
    let highest = records
        .iter()
        .filter_map(|record| record.id.0.strip_prefix("app-"))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    ApplicationId(format!("app-{:06}", highest + 1))
}

fn newest_first(records: &[CandidateApplication]) -> Vec<CandidateApplication> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
    sorted
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<Mutex<Vec<CandidateApplication>>>,
}

impl ApplicationStore for InMemoryApplicationStore {
    fn insert(&self, application: NewApplication) -> Result<CandidateApplication, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let record = CandidateApplication {
            id: next_id(&guard),
            created_at: Utc::now(),
            answers: application,
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn list_recent(&self) -> Result<Vec<CandidateApplication>, RepositoryError> {
        Ok(newest_first(&lock(&self.records)?))
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<CandidateApplication>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }
}

/// Applications persisted as one JSON array, rewritten through a temp file on every insert.
pub(crate) struct JsonFileApplicationStore {
    path: PathBuf,
    records: Mutex<Vec<CandidateApplication>>,
}

impl JsonFileApplicationStore {
    pub(crate) fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let records = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err),
        };
        info!(path = %path.display(), records = records.len(), "application file opened");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    fn persist(&self, records: &[CandidateApplication]) -> io::Result<()> {
        let payload = serde_json::to_vec_pretty(records)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let staging = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&staging)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&staging, &self.path)
    }
}

impl ApplicationStore for JsonFileApplicationStore {
    fn insert(&self, application: NewApplication) -> Result<CandidateApplication, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let record = CandidateApplication {
            id: next_id(&guard),
            created_at: Utc::now(),
            answers: application,
        };
        guard.push(record.clone());
        if let Err(err) = self.persist(&guard) {
            guard.pop();
            return Err(RepositoryError::Unavailable(format!(
                "failed to write {}: {err}",
                self.path.display()
            )));
        }
        Ok(record)
    }

    fn list_recent(&self) -> Result<Vec<CandidateApplication>, RepositoryError> {
        Ok(newest_first(&lock(&self.records)?))
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<CandidateApplication>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }
}

/// The store chosen by `APP_STORE`.
pub(crate) enum ConfiguredStore {
    Memory(InMemoryApplicationStore),
    File(JsonFileApplicationStore),
}

impl ConfiguredStore {
    pub(crate) fn open(config: &StorageConfig) -> io::Result<Self> {
        match config.backend {
            StoreBackend::Memory => Ok(Self::Memory(InMemoryApplicationStore::default())),
            StoreBackend::File => {
                JsonFileApplicationStore::open(config.applications_file()).map(Self::File)
            }
        }
    }
}

impl ApplicationStore for ConfiguredStore {
    fn insert(&self, application: NewApplication) -> Result<CandidateApplication, RepositoryError> {
        match self {
            Self::Memory(store) => store.insert(application),
            Self::File(store) => store.insert(application),
        }
    }

    fn list_recent(&self) -> Result<Vec<CandidateApplication>, RepositoryError> {
        match self {
            Self::Memory(store) => store.list_recent(),
            Self::File(store) => store.list_recent(),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<CandidateApplication>, RepositoryError> {
        match self {
            Self::Memory(store) => store.fetch(id),
            Self::File(store) => store.fetch(id),
        }
    }
}

/// Resumes stored as plain files and served back under `<public_base_url>/resumes/`.
pub(crate) struct LocalResumeStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalResumeStorage {
    pub(crate) fn open(dir: impl Into<PathBuf>, public_base_url: &str) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, object_name: &str) -> Result<PathBuf, StorageError> {
        let valid = !object_name.is_empty()
            && !object_name.starts_with('.')
            && !object_name.contains(['/', '\\'])
            && Path::new(object_name).file_name().is_some();
        if valid {
            Ok(self.dir.join(object_name))
        } else {
            Err(StorageError::InvalidName(object_name.to_string()))
        }
    }
}

impl ResumeStorage for LocalResumeStorage {
    fn upload(&self, object_name: &str, content_type: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let path = self.object_path(object_name)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| match err.kind() {
                io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(object_name.to_string()),
                _ => StorageError::Unavailable(err.to_string()),
            })?;
        file.write_all(bytes)
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        debug!(object = object_name, content_type, size = bytes.len(), "resume written");

        Ok(format!("{}/resumes/{}", self.public_base_url, object_name))
    }

    fn open(&self, object_name: &str) -> Result<Option<StoredObject>, StorageError> {
        let path = self.object_path(object_name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(StoredObject {
                content_type: mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string(),
                bytes,
            })),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Unavailable(err.to_string())),
        }
    }

    fn remove(&self, object_name: &str) -> Result<(), StorageError> {
        let path = self.object_path(object_name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(object = object_name, "resume removed");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Unavailable(err.to_string())),
        }
    }
}
