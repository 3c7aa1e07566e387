use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::console::ConsoleState;
use crate::config::AdminConfig;

const TOKEN_LENGTH: usize = 48;

/// Hex SHA-256 of a password, the form `ADMIN_PASSWORD_SHA256` expects.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Server-side admin credentials. Only the password digest is retained.
#[derive(Clone)]
pub struct AdminCredentials {
    email: String,
    password_sha256: String,
}

impl AdminCredentials {
    pub fn from_config(config: &AdminConfig) -> Self {
        Self {
            email: config.email.clone(),
            password_sha256: config.password_sha256.to_ascii_lowercase(),
        }
    }

    pub fn from_password(email: impl Into<String>, password: &str) -> Self {
        Self {
            email: email.into(),
            password_sha256: hash_password(password),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn verify(&self, email: &str, password: &str) -> bool {
        let email_matches = self.email == email;
        let digest_matches = constant_time_eq(
            hash_password(password).as_bytes(),
            self.password_sha256.as_bytes(),
        );
        email_matches & digest_matches
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// `validate_admin` against whatever credentials are configured; none means nobody gets in.
pub fn validate_admin(credentials: Option<&AdminCredentials>, email: &str, password: &str) -> bool {
    credentials.is_some_and(|credentials| credentials.verify(email, password))
}

/// Opaque bearer token naming one admin session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        Self(token)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// An authenticated admin and the console view they are looking at.
#[derive(Debug)]
pub struct AdminSession {
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub console: ConsoleState,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Credenciales incorrectas")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("session is not authenticated")]
    UnknownSession,
}

/// Live admin sessions. Created on login, torn down on logout or restart.
#[derive(Debug, Default)]
pub struct AdminSessions {
    sessions: Mutex<HashMap<SessionToken, AdminSession>>,
}

impl AdminSessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionToken, AdminSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self, email: &str, now: DateTime<Utc>) -> SessionToken {
        let token = SessionToken::generate();
        self.sessions().insert(
            token.clone(),
            AdminSession {
                email: email.to_string(),
                issued_at: now,
                console: ConsoleState::new(),
            },
        );
        token
    }

    pub fn is_authenticated(&self, token: &SessionToken) -> bool {
        self.sessions().contains_key(token)
    }

    /// Returns whether a session was actually removed.
    pub fn close(&self, token: &SessionToken) -> bool {
        self.sessions().remove(token).is_some()
    }

    pub fn with_session<T>(
        &self,
        token: &SessionToken,
        apply: impl FnOnce(&mut AdminSession) -> T,
    ) -> Result<T, AuthError> {
        let mut sessions = self.sessions();
        let session = sessions.get_mut(token).ok_or(AuthError::UnknownSession)?;
        Ok(apply(session))
    }
}
