//! Saved location, durable alongside the cart.
//!
//! Mirrors the browser's `userLocation` storage key: the last resolved or
//! hand-entered location survives restarts, and malformed stored content is
//! discarded rather than crashing the load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Storage key (file stem) for the saved location.
pub const LOCATION_STORAGE_KEY: &str = "userLocation";

/// A resolved location: coordinates plus the label shown in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Single owner of the saved-location state.
#[derive(Clone)]
pub struct LocationStore {
    inner: Arc<LocationStoreInner>,
}

struct LocationStoreInner {
    path: PathBuf,
    slot: Mutex<Option<SavedLocation>>,
}

impl LocationStore {
    /// Open the location file under `data_dir`; damage reads as "no location".
    ///
    /// # Errors
    ///
    /// Returns an error only if the data directory cannot be created.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(format!("{LOCATION_STORAGE_KEY}.json"));
        let slot = load_location(&path);

        Ok(Self {
            inner: Arc::new(LocationStoreInner {
                path,
                slot: Mutex::new(slot),
            }),
        })
    }

    /// The saved location, if any.
    #[must_use]
    pub fn get(&self) -> Option<SavedLocation> {
        self.lock_slot().clone()
    }

    /// Replace the saved location and persist it.
    ///
    /// # Errors
    ///
    /// Returns the write error; the in-memory value is updated regardless.
    pub fn set(&self, location: SavedLocation) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(&location).map_err(io::Error::other)?;
        *self.lock_slot() = Some(location);
        fs::write(&self.inner.path, json)
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<SavedLocation>> {
        match self.inner.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn load_location(path: &Path) -> Option<SavedLocation> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
        Err(error) => {
            warn!(%error, path = %path.display(), "location file unreadable, ignoring");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(location) => Some(location),
        Err(error) => {
            warn!(%error, path = %path.display(), "location file malformed, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = env::temp_dir().join(format!("snorty-location-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn test_round_trip() {
        let dir = temp_dir();
        let store = LocationStore::open(&dir).expect("open");
        assert_eq!(store.get(), None);

        let location = SavedLocation {
            label: "Berlin, Germany".to_owned(),
            latitude: 52.52,
            longitude: 13.405,
        };
        store.set(location.clone()).expect("set");

        let reloaded = LocationStore::open(&dir).expect("reopen");
        assert_eq!(reloaded.get(), Some(location));
    }

    #[test]
    fn test_malformed_content_is_discarded() {
        let dir = temp_dir();
        fs::write(dir.join(format!("{LOCATION_STORAGE_KEY}.json")), "not json")
            .expect("write fixture");

        let store = LocationStore::open(&dir).expect("open");
        assert_eq!(store.get(), None);
    }
}
