//! Bearer token and role persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role the token was issued for. Decides the login route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    /// Where a user with this role signs in again.
    pub fn login_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/login",
            Role::Doctor => "/doctor/login",
            Role::User => "/login",
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "doctor" => Role::Doctor,
            _ => Role::User,
        })
    }
}

/// Stored session credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Thread-safe credential store, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct CredentialStore {
    current: ArcSwapOption<Credentials>,
    path: Option<PathBuf>,
}

impl CredentialStore {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store, loading existing credentials if present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref().to_path_buf();
        let current = match fs::read_to_string(&path) {
            Ok(content) => Some(Arc::new(serde_json::from_str::<Credentials>(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if current.is_some() {
            tracing::debug!(path = ?path, "Loaded stored credentials");
        }

        Ok(Self {
            current: ArcSwapOption::new(current),
            path: Some(path),
        })
    }

    pub fn get(&self) -> Option<Arc<Credentials>> {
        self.current.load_full()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replace the stored credentials and persist them.
    pub fn store(&self, credentials: Credentials) -> Result<(), CredentialError> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_vec_pretty(&credentials)?)?;
        }
        self.current.store(Some(Arc::new(credentials)));
        Ok(())
    }

    /// Forget the credentials, in memory and on disk.
    pub fn clear(&self) -> Result<(), CredentialError> {
        self.current.store(None);
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
