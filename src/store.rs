// src/store.rs
use anyhow::{Context, Result};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::model::Posting;

/// Persisted posting store: the sole source of truth for "already seen".
/// Identifier uniqueness is guaranteed by keying records on the posting id.
/// Operations are synchronous and single-record; there are no transactions.
pub trait Store: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<Posting>>;
    fn upsert(&self, posting: &Posting) -> Result<()>;
}

/// One JSON file per posting under a data directory, written atomically
/// (tmp + rename). Files are named by a hash of the id; the stored record
/// carries the real id, which `get` verifies on read.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        self.dir.join(format!("{:016x}.json", hasher.finish()))
    }
}

impl Store for JsonFileStore {
    fn get(&self, id: &str) -> Result<Option<Posting>> {
        let path = self.record_path(id);
        let s = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading record {}", path.display()))
            }
        };
        let posting: Posting = serde_json::from_str(&s)
            .with_context(|| format!("decoding record {}", path.display()))?;
        if posting.id != id {
            // Hash collision between two distinct ids: treat as absent.
            tracing::warn!(wanted = id, found = %posting.id, "store hash collision");
            return Ok(None);
        }
        Ok(Some(posting))
    }

    fn upsert(&self, posting: &Posting) -> Result<()> {
        let path = self.record_path(&posting.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(posting).context("encoding posting")?;
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes()).context("writing record")?;
        fs::rename(&tmp, &path).context("committing record")?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Posting>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<Posting>> {
        let map = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("store mutex poisoned"))?;
        Ok(map.get(id).cloned())
    }

    fn upsert(&self, posting: &Posting) -> Result<()> {
        let mut map = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("store mutex poisoned"))?;
        map.insert(posting.id.clone(), posting.clone());
        Ok(())
    }
}
