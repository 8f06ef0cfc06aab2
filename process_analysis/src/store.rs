//! Dataset store
//!
//! Keeps uploaded datasets addressable by an opaque [`DatasetId`] between the
//! upload and the analysis of a dataset. Stores are shared between concurrent
//! requests, so every implementation is `Send + Sync`; entries expire according
//! to a [`StorePolicy`].

use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::core::io::DatasetFormat;
use crate::error::StoreError;

/// Opaque identifier of a stored dataset
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct DatasetId(Uuid);

impl DatasetId {
    /// Generate a fresh random identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for DatasetId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| StoreError::InvalidDatasetId(s.to_string()))
    }
}

/// Raw uploaded bytes together with their container format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDataset {
    /// Container format of `bytes`
    pub format: DatasetFormat,
    /// File contents
    pub bytes: Arc<[u8]>,
}

impl StoredDataset {
    /// Wrap raw bytes.
    pub fn new(format: DatasetFormat, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            format,
            bytes: bytes.into(),
        }
    }
}

/// Retention policy of a [`DatasetStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorePolicy {
    /// Maximum number of datasets kept at once; the oldest one is evicted to make room.
    pub max_entries: Option<usize>,
    /// How long a dataset stays retrievable after it was stored.
    pub time_to_live: Option<Duration>,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            max_entries: Some(256),
            time_to_live: Some(Duration::from_secs(60 * 60)),
        }
    }
}

impl StorePolicy {
    /// Keep everything forever.
    pub fn unbounded() -> Self {
        Self {
            max_entries: None,
            time_to_live: None,
        }
    }
}

/// Concurrency-safe mapping from [`DatasetId`] to uploaded data.
pub trait DatasetStore: Send + Sync {
    /// Insert a dataset under a freshly generated identifier.
    fn put(&self, dataset: StoredDataset) -> Result<DatasetId, StoreError> {
        let id = DatasetId::new_random();
        self.put_with_id(id, dataset)?;
        Ok(id)
    }

    /// Insert a dataset under the given identifier.
    ///
    /// Each identifier can be inserted once; a second insert fails with
    /// [`StoreError::DuplicateId`].
    fn put_with_id(&self, id: DatasetId, dataset: StoredDataset) -> Result<(), StoreError>;

    /// Fetch a dataset. Expired or unknown identifiers yield `Ok(None)`.
    fn get(&self, id: &DatasetId) -> Result<Option<StoredDataset>, StoreError>;

    /// Remove a dataset, returning whether it was present.
    fn remove(&self, id: &DatasetId) -> bool;

    /// Number of entries currently held (including not yet purged expired ones).
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct Timestamped<T> {
    value: T,
    inserted_at: Instant,
}

/// [`DashMap`] with insert-once semantics, expiry and a size cap.
///
/// Reads and removals go straight to the map; inserts are serialized by
/// `insert_lock` so that eviction and insertion never interleave.
#[derive(Debug)]
struct ExpiringMap<T> {
    entries: DashMap<DatasetId, Timestamped<T>>,
    insert_lock: Mutex<()>,
    policy: StorePolicy,
}

impl<T> ExpiringMap<T> {
    fn new(policy: StorePolicy) -> Self {
        Self {
            entries: DashMap::new(),
            insert_lock: Mutex::new(()),
            policy,
        }
    }

    fn is_expired(&self, inserted_at: Instant) -> bool {
        self.policy
            .time_to_live
            .is_some_and(|ttl| inserted_at.elapsed() >= ttl)
    }

    fn purge_expired(&self) {
        let expired: Vec<DatasetId> = self
            .entries
            .iter()
            .filter(|e| self.is_expired(e.inserted_at))
            .map(|e| *e.key())
            .collect();
        for id in expired {
            if self.entries.remove(&id).is_some() {
                tracing::debug!(%id, "Purged expired dataset");
            }
        }
    }

    fn make_room(&self) {
        let Some(max_entries) = self.policy.max_entries else {
            return;
        };
        while !self.entries.is_empty() && self.entries.len() >= max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.inserted_at)
                .map(|e| *e.key());
            let Some(id) = oldest else {
                break;
            };
            self.entries.remove(&id);
            tracing::warn!(%id, max_entries, "Evicted oldest dataset to stay within capacity");
        }
    }

    fn insert_once(&self, id: DatasetId, value: T) -> Result<(), StoreError> {
        let _guard = self
            .insert_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.purge_expired();
        if self.entries.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        self.make_room();
        match self.entries.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId(id)),
            Entry::Vacant(slot) => {
                slot.insert(Timestamped {
                    value,
                    inserted_at: Instant::now(),
                });
                Ok(())
            }
        }
    }

    fn get_with<R>(&self, id: &DatasetId, f: impl FnOnce(&T) -> R) -> Option<R> {
        if let Some(entry) = self.entries.get(id) {
            if !self.is_expired(entry.inserted_at) {
                return Some(f(&entry.value));
            }
        } else {
            return None;
        }
        self.entries.remove(id);
        None
    }

    fn remove(&self, id: &DatasetId) -> bool {
        self.entries.remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// [`DatasetStore`] keeping the uploaded bytes in memory
#[derive(Debug)]
pub struct InMemoryDatasetStore {
    entries: ExpiringMap<StoredDataset>,
}

impl Default for InMemoryDatasetStore {
    fn default() -> Self {
        Self::new(StorePolicy::default())
    }
}

impl InMemoryDatasetStore {
    /// Create an empty store with the given retention policy.
    pub fn new(policy: StorePolicy) -> Self {
        Self {
            entries: ExpiringMap::new(policy),
        }
    }
}

impl DatasetStore for InMemoryDatasetStore {
    fn put_with_id(&self, id: DatasetId, dataset: StoredDataset) -> Result<(), StoreError> {
        self.entries.insert_once(id, dataset)
    }

    fn get(&self, id: &DatasetId) -> Result<Option<StoredDataset>, StoreError> {
        Ok(self.entries.get_with(id, StoredDataset::clone))
    }

    fn remove(&self, id: &DatasetId) -> bool {
        self.entries.remove(id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug)]
struct SpilledDataset {
    format: DatasetFormat,
    file: NamedTempFile,
}

/// [`DatasetStore`] writing each upload to a named temporary file.
///
/// The file is deleted as soon as its entry is removed, evicted or expired.
#[derive(Debug)]
pub struct TempFileDatasetStore {
    entries: ExpiringMap<SpilledDataset>,
}

impl Default for TempFileDatasetStore {
    fn default() -> Self {
        Self::new(StorePolicy::default())
    }
}

impl TempFileDatasetStore {
    /// Create an empty store with the given retention policy.
    pub fn new(policy: StorePolicy) -> Self {
        Self {
            entries: ExpiringMap::new(policy),
        }
    }

    /// Location of the temporary file backing a dataset.
    pub fn path_of(&self, id: &DatasetId) -> Option<std::path::PathBuf> {
        self.entries
            .get_with(id, |spilled| spilled.file.path().to_path_buf())
    }
}

impl DatasetStore for TempFileDatasetStore {
    fn put_with_id(&self, id: DatasetId, dataset: StoredDataset) -> Result<(), StoreError> {
        let mut file = tempfile::Builder::new()
            .prefix("dataset-")
            .suffix(&format!(".{}", dataset.format))
            .tempfile()?;
        file.write_all(&dataset.bytes)?;
        file.flush()?;
        self.entries.insert_once(
            id,
            SpilledDataset {
                format: dataset.format,
                file,
            },
        )
    }

    fn get(&self, id: &DatasetId) -> Result<Option<StoredDataset>, StoreError> {
        self.entries
            .get_with(id, |spilled| {
                std::fs::read(spilled.file.path())
                    .map(|bytes| StoredDataset::new(spilled.format, bytes))
            })
            .transpose()
            .map_err(StoreError::from)
    }

    fn remove(&self, id: &DatasetId) -> bool {
        self.entries.remove(id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(text: &str) -> StoredDataset {
        StoredDataset::new(DatasetFormat::Csv, text.as_bytes())
    }

    #[test]
    fn test_put_and_get() {
        let store = InMemoryDatasetStore::default();
        let id = store.put(csv("a,b\n1,2\n")).unwrap();
        let stored = store.get(&id).unwrap().unwrap();
        assert_eq!(&*stored.bytes, b"a,b\n1,2\n");
        assert!(store.get(&DatasetId::new_random()).unwrap().is_none());
        assert!(store.remove(&id));
        assert!(store.get(&id).unwrap().is_none());
    }

    #[test]
    fn test_insert_once() {
        let store = InMemoryDatasetStore::default();
        let id = DatasetId::new_random();
        store.put_with_id(id, csv("a\n")).unwrap();
        assert!(matches!(
            store.put_with_id(id, csv("b\n")),
            Err(StoreError::DuplicateId(dup)) if dup == id
        ));
        assert_eq!(&*store.get(&id).unwrap().unwrap().bytes, b"a\n");
    }

    #[test]
    fn test_expired_entries_are_invisible() {
        let store = InMemoryDatasetStore::new(StorePolicy {
            max_entries: None,
            time_to_live: Some(Duration::ZERO),
        });
        let id = store.put(csv("a\n")).unwrap();
        assert!(store.get(&id).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = InMemoryDatasetStore::new(StorePolicy {
            max_entries: Some(2),
            time_to_live: None,
        });
        let first = store.put(csv("1\n")).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let second = store.put(csv("2\n")).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let third = store.put(csv("3\n")).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get(&first).unwrap().is_none());
        assert!(store.get(&second).unwrap().is_some());
        assert!(store.get(&third).unwrap().is_some());
    }

    #[test]
    fn test_concurrent_puts() {
        let store = InMemoryDatasetStore::new(StorePolicy::unbounded());
        let ids: Vec<DatasetId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    s.spawn(move || store.put(csv(&format!("{i}\n"))).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(store.len(), 8);
        for id in ids {
            assert!(store.get(&id).unwrap().is_some());
        }
    }

    #[test]
    fn test_concurrent_puts_respect_capacity() {
        let store = InMemoryDatasetStore::new(StorePolicy {
            max_entries: Some(3),
            time_to_live: None,
        });
        std::thread::scope(|s| {
            for i in 0..16 {
                let store = &store;
                s.spawn(move || {
                    for j in 0..8 {
                        store.put(csv(&format!("{i},{j}\n"))).unwrap();
                        assert!(store.len() <= 3);
                    }
                });
            }
        });
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_temp_file_store_deletes_files() {
        let store = TempFileDatasetStore::new(StorePolicy::unbounded());
        let id = store.put(csv("case,activity\n1,A\n")).unwrap();
        let path = store.path_of(&id).unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "csv");
        assert_eq!(
            &*store.get(&id).unwrap().unwrap().bytes,
            b"case,activity\n1,A\n"
        );

        assert!(store.remove(&id));
        assert!(!path.exists());
    }

    #[test]
    fn test_dataset_id_round_trip() {
        let id = DatasetId::new_random();
        assert_eq!(id.to_string().parse::<DatasetId>().unwrap(), id);
        assert!(matches!(
            "not-a-uuid".parse::<DatasetId>(),
            Err(StoreError::InvalidDatasetId(_))
        ));
    }
}
