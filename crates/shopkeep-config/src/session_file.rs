// File-backed session persistence.
//
// The session is stored as a small TOML file with the keys `token`,
// `name`, `email` and `user_id`. Any missing key makes the record load
// as anonymous (see `StoredSession::into_session`); logout removes the
// file entirely. Writes go to a private temp file in the same directory
// that is renamed over the old one, so the token is never world-readable.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use shopkeep_core::{CoreError, SessionStore, StoredSession};

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn store_err(action: &str, path: &Path, err: impl std::fmt::Display) -> CoreError {
    CoreError::Store {
        message: format!("cannot {action} {}: {err}", path.display()),
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>, CoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_err("read", &self.path, e)),
        };
        debug!(path = %self.path.display(), "loading persisted session");
        let record: StoredSession =
            toml::from_str(&text).map_err(|e| store_err("parse", &self.path, e))?;
        Ok(Some(record))
    }

    fn save(&self, record: &StoredSession) -> Result<(), CoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| store_err("create", dir, e))?;
        let text = toml::to_string_pretty(record).map_err(|e| store_err("encode", &self.path, e))?;

        // Dropping `tmp` on any early return removes it.
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| store_err("create", dir, e))?;
        restrict_permissions(tmp.path())?;
        if let Err(e) = tmp.write_all(text.as_bytes()) {
            return Err(store_err("write", tmp.path(), e));
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| store_err("write", tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| store_err("write", &self.path, e.error))?;

        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_err("remove", &self.path, e)),
        }
    }
}

/// The file holds a bearer token: owner read/write only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| store_err("secure", path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shopkeep_core::SessionState;

    use super::*;

    fn record() -> StoredSession {
        StoredSession {
            token: Some("jwt".into()),
            name: Some("Ana".into()),
            email: Some("ana@x.com".into()),
            actor_id: Some("u1".into()),
        }
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions/default.toml"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&record()).unwrap();
        assert_eq!(store.load().unwrap(), Some(record()));

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("user_id = \"u1\""));

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn partial_file_initializes_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "token = \"jwt\"\nname = \"Ana\"\n").unwrap();

        let state = SessionState::new(Arc::new(FileSessionStore::new(path)));

        assert!(!state.initialize());
    }

    #[test]
    fn corrupt_file_initializes_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        let store = FileSessionStore::new(path);

        assert!(store.load().is_err());
        assert!(!SessionState::new(Arc::new(store)).initialize());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("s.toml"));
        store.save(&record()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn save_replaces_a_readable_file_without_leftovers() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.toml");
        std::fs::write(&path, "token = \"old\"\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileSessionStore::new(path.clone());
        store.save(&record()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap(), Some(record()));
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
