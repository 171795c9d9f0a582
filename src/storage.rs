use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// 1. ClientStorage Contract
/// ClientStorage
///
/// Durable client-side storage. It holds exactly two items: the raw bearer token and the
/// display theme. The token is the only mutable resource shared across the console: the API
/// client reads it on every request, and only the session store and the 401 interceptor
/// write it. Concurrent writers resolve last-write-wins.
///
/// Implementations never fail loudly. A storage that cannot be read behaves like an empty one
/// (nobody is logged in), and failed writes are logged.
pub trait ClientStorage: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn remove_token(&self);
    fn theme(&self) -> Option<Theme>;
    fn set_theme(&self, theme: Theme);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// The on-disk document. Field names match the browser storage keys of the web dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredItems {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
}

// 2. The File Implementation
/// FileClientStorage
///
/// Persists the items as a small JSON document. Every operation re-reads the file so that
/// two console processes sharing a storage path observe each other's login and logout.
pub struct FileClientStorage {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileClientStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StoredItems {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoredItems::default(),
            Err(e) => {
                tracing::error!("client storage read error ({}): {:?}", self.path.display(), e);
                return StoredItems::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::error!("client storage is corrupt ({}): {:?}", self.path.display(), e);
            StoredItems::default()
        })
    }

    fn write(&self, items: &StoredItems) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::error!("client storage dir error ({}): {:?}", parent.display(), e);
                    return;
                }
            }
        }
        let body = match serde_json::to_vec_pretty(items) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("client storage encode error: {:?}", e);
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, body) {
            tracing::error!("client storage write error ({}): {:?}", self.path.display(), e);
        }
    }

    fn update(&self, apply: impl FnOnce(&mut StoredItems)) {
        let _held = self.guard.lock();
        let mut items = self.read();
        apply(&mut items);
        self.write(&items);
    }
}

impl ClientStorage for FileClientStorage {
    fn token(&self) -> Option<String> {
        let _held = self.guard.lock();
        self.read().access_token
    }

    fn set_token(&self, token: &str) {
        self.update(|items| items.access_token = Some(token.to_string()));
    }

    fn remove_token(&self) {
        self.update(|items| items.access_token = None);
    }

    fn theme(&self) -> Option<Theme> {
        let _held = self.guard.lock();
        self.read().theme
    }

    fn set_theme(&self, theme: Theme) {
        self.update(|items| items.theme = Some(theme));
    }
}

// 3. The In-Memory Implementation
/// MemoryClientStorage
///
/// Process-local storage. Used by tests and by callers that want a session which does not
/// survive the process.
#[derive(Default)]
pub struct MemoryClientStorage {
    items: Mutex<StoredItems>,
}

impl MemoryClientStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let storage = Self::default();
        storage.set_token(token);
        storage
    }
}

impl ClientStorage for MemoryClientStorage {
    fn token(&self) -> Option<String> {
        self.items.lock().access_token.clone()
    }

    fn set_token(&self, token: &str) {
        self.items.lock().access_token = Some(token.to_string());
    }

    fn remove_token(&self) {
        self.items.lock().access_token = None;
    }

    fn theme(&self) -> Option<Theme> {
        self.items.lock().theme
    }

    fn set_theme(&self, theme: Theme) {
        self.items.lock().theme = Some(theme);
    }
}

/// ClientStorageState
///
/// The shared handle passed to the session store and the API client.
pub type ClientStorageState = Arc<dyn ClientStorage>;
