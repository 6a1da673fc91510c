use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SIDEBAR_STATE_KEY: &str = "sidebar:state";
pub const SIDEBAR_EXPANDED: &str = "expanded";
pub const SIDEBAR_COLLAPSED: &str = "collapsed";

// Narrow persistence seam so view-state logic never touches the filesystem
// directly; tests use the in-memory implementation.
pub trait StoragePort {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

// Open unless an explicit "collapsed" was stored.
pub fn initial_sidebar_open(storage: &dyn StoragePort) -> bool {
    storage.get(SIDEBAR_STATE_KEY).as_deref() != Some(SIDEBAR_COLLAPSED)
}

pub fn save_sidebar_state(storage: &mut dyn StoragePort, open: bool) {
    let value = if open {
        SIDEBAR_EXPANDED
    } else {
        SIDEBAR_COLLAPSED
    };
    storage.set(SIDEBAR_STATE_KEY, value);
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_state_path() -> PathBuf {
    home_dir().join(".tangram").join("ui-state.json")
}

// Flat string map persisted as pretty JSON. Writes go through a sibling tmp
// file and a rename so a crash never leaves a torn file behind.
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    pub fn load_default() -> Self {
        Self::load(default_state_path())
    }

    pub fn load(path: PathBuf) -> Self {
        let entries = match fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|err| {
                warn!("discarding unreadable ui state {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("failed to read ui state {}: {err}", path.display());
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    fn persist(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(&self.entries)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
        let tmp_path = tmp_path_for(&self.path);

        fs::write(&tmp_path, bytes)?;
        match fs::rename(&tmp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                    fs::rename(&tmp_path, &self.path)?;
                    Ok(())
                } else {
                    Err(rename_err)
                }
            }
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist() {
            warn!("failed to persist ui state {}: {err}", self.path.display());
        }
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_state_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tangram_prefs_{prefix}_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn sidebar_defaults_to_open_without_saved_state() {
        let storage = MemoryStorage::default();
        assert!(initial_sidebar_open(&storage));
    }

    #[test]
    fn sidebar_honors_saved_collapsed_state() {
        let mut storage = MemoryStorage::default();
        save_sidebar_state(&mut storage, false);
        assert_eq!(
            storage.get(SIDEBAR_STATE_KEY).as_deref(),
            Some(SIDEBAR_COLLAPSED)
        );
        assert!(!initial_sidebar_open(&storage));

        save_sidebar_state(&mut storage, true);
        assert!(initial_sidebar_open(&storage));
    }

    #[test]
    fn unknown_saved_value_means_open() {
        let mut storage = MemoryStorage::default();
        storage.set(SIDEBAR_STATE_KEY, "sideways");
        assert!(initial_sidebar_open(&storage));
    }

    #[test]
    fn file_storage_round_trips_through_disk() {
        let path = temp_state_path("roundtrip");

        {
            let mut storage = FileStorage::load(path.clone());
            storage.set(SIDEBAR_STATE_KEY, SIDEBAR_COLLAPSED);
        }

        let reloaded = FileStorage::load(path.clone());
        assert_eq!(
            reloaded.get(SIDEBAR_STATE_KEY).as_deref(),
            Some(SIDEBAR_COLLAPSED)
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_state_file_is_discarded() {
        let path = temp_state_path("corrupt");
        fs::write(&path, b"not json").expect("fixture should write");

        let storage = FileStorage::load(path.clone());
        assert!(storage.get(SIDEBAR_STATE_KEY).is_none());

        let _ = fs::remove_file(path);
    }
}
