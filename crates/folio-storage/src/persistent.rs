use crate::wal::{Wal, WalRecord};
use crate::{InMemoryStore, Storage};
use folio_core::{ContentDocument, FolioError, ListQuery, NewDocument, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// In-memory engine made durable by a write-ahead log under `data_dir/wal`.
pub struct PersistentStore {
    mem: InMemoryStore,
    wal: parking_lot::Mutex<Wal>,
    data_dir: PathBuf,
}

impl PersistentStore {
    pub fn open(data_dir: PathBuf) -> std::io::Result<Self> {
        let wal_dir = data_dir.join("wal");
        let mem = InMemoryStore::new();
        let mut replayed = 0usize;
        for rec in Wal::replay(&wal_dir)? {
            match rec {
                WalRecord::Insert { doc } => {
                    mem.replay_insert(doc);
                    replayed += 1;
                }
            }
        }
        let wal = Wal::open(&wal_dir)?;
        info!(dir = %data_dir.display(), replayed, "persistent store opened");
        Ok(Self {
            mem,
            wal: parking_lot::Mutex::new(wal),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn all_documents(&self) -> Vec<ContentDocument> {
        self.mem.all_documents()
    }

    /// Read-only view over what was replayed, without opening a new segment.
    pub fn load(data_dir: &Path) -> std::io::Result<InMemoryStore> {
        let mem = InMemoryStore::new();
        for rec in Wal::replay(&data_dir.join("wal"))? {
            let WalRecord::Insert { doc } = rec;
            mem.replay_insert(doc);
        }
        Ok(mem)
    }
}

#[async_trait::async_trait]
impl Storage for PersistentStore {
    async fn insert(&self, new: NewDocument) -> Result<ContentDocument> {
        // logged before it is indexed, so a failed append is never visible
        self.mem.insert_with(new, |doc| {
            let rec = WalRecord::Insert { doc: doc.clone() };
            self.wal
                .lock()
                .append(&rec)
                .map_err(|e| FolioError::Store(e.to_string()))
        })
    }

    async fn find_by_title(&self, kind: &str, title: &str) -> Result<Option<ContentDocument>> {
        self.mem.find_by_title(kind, title).await
    }

    async fn query(&self, req: &ListQuery) -> Result<Vec<ContentDocument>> {
        self.mem.query(req).await
    }
}
