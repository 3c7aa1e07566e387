use chrono::{Duration, FixedOffset, Offset, Utc};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub reporting: ReportingConfig,
    pub wizards: WizardConfig,
    pub admin: Option<AdminConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(value) => LogFormat::parse(&value)?,
            Err(_) if environment == AppEnvironment::Production => LogFormat::Json,
            Err(_) => LogFormat::Compact,
        };

        let backend = StoreBackend::parse(
            &env::var("APP_STORE").unwrap_or_else(|_| "file".to_string()),
        )?;
        let data_dir = PathBuf::from(env::var("APP_DATA_DIR").unwrap_or_else(|_| "./data".to_string()));
        let public_base_url = env::var("APP_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let offset_minutes = env::var("APP_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| DEFAULT_UTC_OFFSET_MINUTES.to_string())
            .trim()
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidUtcOffset)?;
        let utc_offset =
            FixedOffset::east_opt(offset_minutes * 60).ok_or(ConfigError::InvalidUtcOffset)?;

        let idle_minutes = env::var("APP_WIZARD_IDLE_MINUTES")
            .unwrap_or_else(|_| DEFAULT_WIZARD_IDLE_MINUTES.to_string())
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|minutes| (1..=MAX_WIZARD_IDLE_MINUTES).contains(minutes))
            .ok_or(ConfigError::InvalidWizardIdle)?;

        let admin = AdminConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            storage: StorageConfig {
                backend,
                data_dir,
                public_base_url,
            },
            reporting: ReportingConfig { utc_offset },
            wizards: WizardConfig {
                idle_ttl: Duration::minutes(idle_minutes),
            },
            admin,
        })
    }
}

/// Bogotá, the campaign's home time zone.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -300;

const DEFAULT_WIZARD_IDLE_MINUTES: i64 = 120;
const MAX_WIZARD_IDLE_MINUTES: i64 = 7 * 24 * 60;

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Line format for log output. Production defaults to JSON for log shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnknownLogFormat(other.to_string())),
        }
    }
}

/// Which application store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory),
            "file" | "json" => Ok(Self::File),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

/// Where records and uploaded resumes live, and how resumes are addressed publicly.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub public_base_url: String,
}

impl StorageConfig {
    pub fn applications_file(&self) -> PathBuf {
        self.data_dir.join("applications.json")
    }

    pub fn resumes_dir(&self) -> PathBuf {
        self.data_dir.join("resumes")
    }
}

/// Calendar settings for console stats and export timestamps.
#[derive(Debug, Clone, Copy)]
pub struct ReportingConfig {
    pub utc_offset: FixedOffset,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

/// How long an untouched wizard session is kept before it is discarded.
#[derive(Debug, Clone, Copy)]
pub struct WizardConfig {
    pub idle_ttl: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::minutes(DEFAULT_WIZARD_IDLE_MINUTES),
        }
    }
}

/// Admin console credentials. The password is only ever held as a SHA-256 digest.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub email: String,
    pub password_sha256: String,
}

impl AdminConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let email = env::var("ADMIN_EMAIL").ok().filter(|value| !value.trim().is_empty());
        let digest = env::var("ADMIN_PASSWORD_SHA256")
            .ok()
            .filter(|value| !value.trim().is_empty());

        match (email, digest) {
            (None, None) => Ok(None),
            (Some(email), Some(digest)) => {
                let digest = digest.trim().to_ascii_lowercase();
                if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(ConfigError::InvalidAdminDigest);
                }
                Ok(Some(Self {
                    email: email.trim().to_string(),
                    password_sha256: digest,
                }))
            }
            _ => Err(ConfigError::IncompleteAdminCredentials),
        }
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownStore(String),
    UnknownLogFormat(String),
    InvalidUtcOffset,
    InvalidWizardIdle,
    InvalidAdminDigest,
    IncompleteAdminCredentials,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownStore(value) => {
                write!(f, "APP_STORE must be 'memory' or 'file' (found '{value}')")
            }
            ConfigError::UnknownLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (found '{value}')")
            }
            ConfigError::InvalidUtcOffset => write!(
                f,
                "APP_UTC_OFFSET_MINUTES must be a whole number of minutes within +/-24h"
            ),
            ConfigError::InvalidWizardIdle => write!(
                f,
                "APP_WIZARD_IDLE_MINUTES must be a whole number of minutes between 1 and 10080"
            ),
            ConfigError::InvalidAdminDigest => {
                write!(f, "ADMIN_PASSWORD_SHA256 must be a 64 character hex digest")
            }
            ConfigError::IncompleteAdminCredentials => write!(
                f,
                "ADMIN_EMAIL and ADMIN_PASSWORD_SHA256 must be set together"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "APP_STORE",
            "APP_DATA_DIR",
            "APP_PUBLIC_BASE_URL",
            "APP_UTC_OFFSET_MINUTES",
            "APP_WIZARD_IDLE_MINUTES",
            "ADMIN_EMAIL",
            "ADMIN_PASSWORD_SHA256",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.storage.backend, StoreBackend::File);
        assert_eq!(config.storage.public_base_url, "http://127.0.0.1:3000");
        assert_eq!(config.reporting.utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(config.wizards.idle_ttl, Duration::minutes(120));
        assert!(config.admin.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn admin_credentials_must_be_paired() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMIN_EMAIL", "talento@dosmicos.co");
        let err = AppConfig::load().expect_err("digest missing");
        assert!(matches!(err, ConfigError::IncompleteAdminCredentials));

        env::set_var("ADMIN_PASSWORD_SHA256", "not-a-digest");
        let err = AppConfig::load().expect_err("digest malformed");
        assert!(matches!(err, ConfigError::InvalidAdminDigest));

        env::set_var(
            "ADMIN_PASSWORD_SHA256",
            "5E884898DA28047151D0E56F8DC6292773603D0D6AABBDD62A11EF721D1542D8",
        );
        let config = AppConfig::load().expect("credentials load");
        let admin = config.admin.expect("admin configured");
        assert_eq!(admin.email, "talento@dosmicos.co");
        assert_eq!(
            admin.password_sha256,
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        reset_env();
    }

    #[test]
    fn rejects_unknown_store_backend() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_STORE", "supabase");
        let err = AppConfig::load().expect_err("unknown backend");
        assert!(matches!(err, ConfigError::UnknownStore(ref value) if value == "supabase"));
        reset_env();
    }

    #[test]
    fn wizard_idle_window_must_be_positive() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_WIZARD_IDLE_MINUTES", "0");
        let err = AppConfig::load().expect_err("zero window rejected");
        assert!(matches!(err, ConfigError::InvalidWizardIdle));

        env::set_var("APP_WIZARD_IDLE_MINUTES", "45");
        let config = AppConfig::load().expect("window loads");
        assert_eq!(config.wizards.idle_ttl, Duration::minutes(45));
        reset_env();
    }

    #[test]
    fn production_logs_json_unless_overridden() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.telemetry.format, LogFormat::Json);

        env::set_var("APP_LOG_FORMAT", "compact");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.telemetry.format, LogFormat::Compact);

        env::set_var("APP_LOG_FORMAT", "xml");
        let err = AppConfig::load().expect_err("unknown format");
        assert!(matches!(err, ConfigError::UnknownLogFormat(ref value) if value == "xml"));
        reset_env();
    }
}
