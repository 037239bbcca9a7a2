//! Token store adapters
//!
//! [`MemoryTokenStore`] keeps credentials for the life of the process.
//! [`FileTokenStore`] additionally persists them to a JSON file so a session
//! survives restarts, the way a browser keeps them in local storage.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use auditdesk_core::session::TokenStore;
use auditdesk_domain::{ConfigError, UserInfo};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Everything a token store remembers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredSession {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_info: Option<UserInfo>,
    pub permissions: Vec<String>,
}

/// In-memory token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    state: RwLock<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an access token
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.state.write().token = Some(token.into());
        store
    }

    pub fn snapshot(&self) -> StoredSession {
        self.state.read().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    fn set_token(&self, token: &str) {
        self.state.write().token = Some(token.to_string());
    }

    fn set_refresh_token(&self, refresh_token: &str) {
        self.state.write().refresh_token = Some(refresh_token.to_string());
    }

    fn user(&self) -> Option<UserInfo> {
        self.state.read().user_info.clone()
    }

    fn set_user(&self, user: &UserInfo) {
        self.state.write().user_info = Some(user.clone());
    }

    fn permissions(&self) -> Vec<String> {
        self.state.read().permissions.clone()
    }

    fn set_permissions(&self, permissions: &[String]) {
        self.state.write().permissions = permissions.to_vec();
    }

    fn clear(&self) {
        *self.state.write() = StoredSession::default();
    }
}

/// Token store persisted to a JSON file
///
/// Every change is written to a sibling temp file and renamed over the
/// session file, so a crash mid-write leaves the previous session intact.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    state: RwLock<StoredSession>,
    /// Bumped under the state lock on every change
    version: AtomicU64,
    /// Last version written to disk; serialises file writes
    written: Mutex<u64>,
}

impl FileTokenStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty session. An unreadable or corrupt file is
    /// logged and treated as empty, since a lost session only costs a login.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Io(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let state = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "discarding corrupt session file");
                StoredSession::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredSession::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read session file");
                StoredSession::default()
            }
        };

        debug!(path = %path.display(), authenticated = state.token.is_some(), "session store opened");
        Ok(Self { path, state: RwLock::new(state), version: AtomicU64::new(0), written: Mutex::new(0) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, f: impl FnOnce(&mut StoredSession)) {
        let (version, bytes) = {
            let mut state = self.state.write();
            f(&mut state);
            (self.version.fetch_add(1, Ordering::SeqCst) + 1, serde_json::to_vec_pretty(&*state))
        };

        let result = bytes.map_err(std::io::Error::other).and_then(|bytes| {
            let mut written = self.written.lock();
            // A newer snapshot already reached the disk.
            if *written >= version {
                return Ok(());
            }
            write_atomically(&self.path, &bytes)?;
            *written = version;
            Ok(())
        });
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    fn set_token(&self, token: &str) {
        self.update(|s| s.token = Some(token.to_string()));
    }

    fn set_refresh_token(&self, refresh_token: &str) {
        self.update(|s| s.refresh_token = Some(refresh_token.to_string()));
    }

    fn user(&self) -> Option<UserInfo> {
        self.state.read().user_info.clone()
    }

    fn set_user(&self, user: &UserInfo) {
        self.update(|s| s.user_info = Some(user.clone()));
    }

    fn permissions(&self) -> Vec<String> {
        self.state.read().permissions.clone()
    }

    fn set_permissions(&self, permissions: &[String]) {
        self.update(|s| s.permissions = permissions.to_vec());
    }

    fn clear(&self) {
        self.update(|s| *s = StoredSession::default());
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn memory_store_clear_forgets_everything() {
        let store = MemoryTokenStore::with_token("a");
        store.set_refresh_token("r");
        store.set_permissions(&["product:read".to_string()]);
        assert!(store.is_authenticated());

        store.clear();
        assert_eq!(store.snapshot(), StoredSession::default());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/session.json");

        let store = FileTokenStore::open(&path).unwrap();
        store.set_token("tok");
        store.set_refresh_token("ref");
        store.set_user(&UserInfo { id: 7, username: "auditor".into(), ..Default::default() });
        drop(store);

        let reopened = FileTokenStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("tok"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("ref"));
        assert_eq!(reopened.user().map(|u| u.id), Some(7));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("refreshToken"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileTokenStore::open(&path).unwrap();
        assert!(store.token().is_none());

        store.set_token("fresh");
        assert_eq!(FileTokenStore::open(&path).unwrap().token().as_deref(), Some("fresh"));
    }

    #[test]
    fn concurrent_writes_leave_latest_session_and_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = std::sync::Arc::new(FileTokenStore::open(&path).unwrap());

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for round in 0..20 {
                        store.set_token(&format!("tok-{worker}-{round}"));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let on_disk = FileTokenStore::open(&path).unwrap().token();
        assert_eq!(on_disk, store.token());

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("session.json")]);
    }

    #[test]
    fn file_store_clear_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::open(&path).unwrap();
        store.set_token("tok");
        store.clear();

        assert!(FileTokenStore::open(&path).unwrap().token().is_none());
    }
}
