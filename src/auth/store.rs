//! Session persistence
//!
//! The signed-in session survives between invocations so `studyqa chat`
//! does not ask for credentials every time. Two backends exist: the OS
//! keyring (default) and a JSON file for headless machines and tests.

use crate::auth::Session;
use crate::config::{SessionConfig, SessionStorage};
use crate::error::{Result, StudyQaError};
use directories::ProjectDirs;
use std::path::PathBuf;

const KEYRING_SERVICE: &str = "studyqa-session";
const KEYRING_USER: &str = "default";

/// Where a session is kept between runs
pub trait SessionStore: Send + Sync {
    /// Load the stored session, if any
    fn load(&self) -> Result<Option<Session>>;

    /// Persist `session`, replacing any previous one
    fn save(&self, session: &Session) -> Result<()>;

    /// Forget the stored session; succeeds when nothing is stored
    fn clear(&self) -> Result<()>;
}

/// Session kept in the OS native credential store
pub struct KeyringSessionStore;

impl KeyringSessionStore {
    fn entry() -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).map_err(StudyQaError::Keyring)?)
    }
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        match Self::entry()?.get_password() {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StudyQaError::Keyring(e).into()),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session)?;
        Self::entry()?
            .set_password(&json)
            .map_err(StudyQaError::Keyring)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StudyQaError::Keyring(e).into()),
        }
    }
}

/// Session kept in a JSON file
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the session file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

/// Application data directory (`~/.local/share/studyqa` on Linux)
pub fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "studyqa", "studyqa")
        .ok_or_else(|| StudyQaError::Config("Could not determine data directory".into()))?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Build the session store selected by configuration
pub fn store_from_config(config: &SessionConfig) -> Result<Box<dyn SessionStore>> {
    match config.storage {
        SessionStorage::Keyring => Ok(Box::new(KeyringSessionStore)),
        SessionStorage::File => {
            let path = match &config.file_path {
                Some(path) => path.clone(),
                None => data_dir()?.join("session.json"),
            };
            tracing::debug!("Using session file {}", path.display());
            Ok(Box::new(FileSessionStore::new(path)))
        }
    }
}
