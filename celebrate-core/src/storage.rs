//! Persistence of the celebration list.
//!
//! The list is one opaque JSON array. There is no schema version; fields
//! missing from older files fall back to their serde defaults.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::celebration::Celebration;
use crate::error::{CelebrateError, CelebrateResult};

const CELEBRATIONS_FILE: &str = "celebrations.json";

#[allow(async_fn_in_trait)]
pub trait CelebrationStorage {
    /// All stored records; empty when nothing was saved yet.
    async fn load(&self) -> CelebrateResult<Vec<Celebration>>;

    /// Replace the stored list.
    async fn save(&self, records: &[Celebration]) -> CelebrateResult<()>;
}

/// Stores the list at `<data_dir>/celebrations.json`.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        JsonFileStorage { path }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(CELEBRATIONS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CelebrationStorage for JsonFileStorage {
    async fn load(&self) -> CelebrateResult<Vec<Celebration>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            CelebrateError::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, records: &[Celebration]) -> CelebrateResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(records)?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

/// In-process storage. Can be told to fail saves.
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<Vec<Celebration>>,
    saves: Mutex<usize>,
    fail_saves: bool,
}

impl MemoryStorage {
    pub fn with_records(records: Vec<Celebration>) -> Self {
        MemoryStorage {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        MemoryStorage {
            fail_saves: true,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> Vec<Celebration> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl CelebrationStorage for MemoryStorage {
    async fn load(&self) -> CelebrateResult<Vec<Celebration>> {
        Ok(self.snapshot())
    }

    async fn save(&self, records: &[Celebration]) -> CelebrateResult<()> {
        if self.fail_saves {
            return Err(CelebrateError::Storage("storage unavailable".into()));
        }

        let poisoned = || CelebrateError::Storage("storage lock poisoned".into());
        *self.records.lock().map_err(|_| poisoned())? = records.to_vec();
        *self.saves.lock().map_err(|_| poisoned())? += 1;
        Ok(())
    }
}
