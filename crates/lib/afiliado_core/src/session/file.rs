//! File-backed session store.
//!
//! Entries live in one JSON object file. Every write replaces the file
//! atomically (temp file in the same directory, then rename) so a crash
//! never leaves a half-written session behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use super::{SessionError, SessionStore};

type Entries = BTreeMap<String, String>;

/// Session store persisted to a JSON file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at the default per-user location.
    pub fn open_default() -> Self {
        Self::new(default_session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| SessionError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), SessionError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|e| SessionError::Corrupt(e.to_string()))?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| SessionError::Io(e.error))?;
        debug!(path = %self.path.display(), entries = entries.len(), "session file written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries) -> bool) -> Result<(), SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        let mut entries = self.read_entries()?;
        if apply(&mut entries) {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

/// Default session file: `<data_dir>/afiliado/session.json`.
pub fn default_session_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("afiliado")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.get("afiliadobot_token").unwrap().is_none());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileSessionStore::new(&path);
        store.set("afiliadobot_token", "t1").unwrap();
        store.set("afiliadobot_user", r#"{"id":1}"#).unwrap();
        drop(store);

        let reopened = FileSessionStore::new(&path);
        assert_eq!(
            reopened.get("afiliadobot_token").unwrap().as_deref(),
            Some("t1")
        );
        assert_eq!(
            reopened.get("afiliadobot_user").unwrap().as_deref(),
            Some(r#"{"id":1}"#)
        );
    }

    #[test]
    fn remove_only_touches_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[1, 2").unwrap();
        let store = FileSessionStore::new(&path);
        assert!(matches!(store.get("a"), Err(SessionError::Corrupt(_))));
    }

    #[test]
    fn default_path_ends_with_session_file() {
        let path = default_session_path();
        assert!(path.ends_with("afiliado/session.json"));
    }
}
