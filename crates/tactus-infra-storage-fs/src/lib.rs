use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tactus_ports::storage::{KeyValueStorePort, StorageError};

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as one JSON object file.
///
/// The file is read once on first access and rewritten in full on every
/// `set`; the mutex keeps concurrent writers from interleaving.
pub struct FsStorage {
    base_dir: PathBuf,
    cache: Mutex<Option<Entries>>,
}

impl FsStorage {
    pub const FILE_NAME: &'static str = "storage.json";

    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            cache: Mutex::new(None),
        }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join("TactusGlove"))
    }

    pub fn path(&self) -> PathBuf {
        self.base_dir.join(Self::FILE_NAME)
    }

    fn read_entries(path: &Path) -> Result<Entries, StorageError> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };
        match serde_json::from_slice(&data) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("{} is corrupt, starting empty: {e}", path.display());
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(path: &Path, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let data =
            serde_json::to_vec_pretty(entries).map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
    }

    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut Entries) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let mut cache = self.cache.lock();
        if cache.is_none() {
            *cache = Some(Self::read_entries(&self.path())?);
        }
        match cache.as_mut() {
            Some(entries) => f(entries),
            None => Err(StorageError::Io("storage cache unavailable".to_string())),
        }
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(base_dir)
    }
}

impl KeyValueStorePort for FsStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_entries(|entries| Ok(entries.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path();
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
            Self::write_entries(&path, entries)
        })
    }
}

/// Volatile store for tests and for running without a config directory.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<Entries>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
