//! Session Storage
//! Mission: Durable client-side home for the bearer token and profile

use crate::auth::models::UserProfile;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// What survives a restart of the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub user: UserProfile,
}

pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file on disk. A missing or unreadable file means "no session".
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(
                    "⚠️  Ignoring corrupt session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(session).context("Failed to encode session")?;
        let mut file = open_private(&self.path)
            .with_context(|| format!("Failed to open session file {}", self.path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;

        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove session file {}", self.path.display())
            }),
        }
    }
}

/// Open for writing, readable by the owner only. An existing file written
/// with wider permissions is narrowed before anything is written to it.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Process-local storage, lost on exit
#[derive(Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<StoredSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use tempfile::TempDir;

    fn create_test_session() -> StoredSession {
        StoredSession {
            token: "header.payload.signature".to_string(),
            user: UserProfile {
                id: "3".to_string(),
                email: "teacher@campus.edu".to_string(),
                name: "Prof. Smith".to_string(),
                role: Role::Teacher,
            },
        }
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested").join("session.json"));

        assert_eq!(storage.load().unwrap(), None);

        storage.save(&create_test_session()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(create_test_session()));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        assert!(!storage.path().exists());

        // clearing twice is fine
        storage.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileSessionStorage::new(&path);

        storage.save(&create_test_session()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // a pre-existing world-readable file is narrowed on save
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        storage.save(&create_test_session()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file_is_no_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemorySessionStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage.save(&create_test_session()).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().user.id, "3");

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
