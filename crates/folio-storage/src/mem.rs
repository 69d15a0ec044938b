use crate::traits::Storage;
use folio_core::{ContentDocument, FolioError, ListQuery, NewDocument, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    // seq -> document, iteration order is insertion order
    docs: BTreeMap<u64, ContentDocument>,
    // kind -> seqs of that kind
    by_kind: HashMap<String, Vec<u64>>,
    // unique title index: (kind, title) -> seq
    titles: HashMap<(String, String), u64>,
    last_seq: u64,
}

impl Inner {
    fn index(&mut self, doc: ContentDocument) {
        self.last_seq = self.last_seq.max(doc.seq);
        self.titles
            .insert((doc.kind.clone(), doc.title.clone()), doc.seq);
        self.by_kind.entry(doc.kind.clone()).or_default().push(doc.seq);
        self.docs.insert(doc.seq, doc);
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-applies a document read back from the write-ahead log.
    pub fn replay_insert(&self, doc: ContentDocument) {
        let mut inner = self.inner.write();
        let key = (doc.kind.clone(), doc.title.clone());
        if inner.titles.contains_key(&key) {
            debug!(kind = %doc.kind, title = %doc.title, "skipping duplicate title on replay");
            return;
        }
        inner.index(doc);
    }

    /// Inserts under the write lock, running `commit` after the title check and
    /// before the document becomes visible. A failing `commit` leaves the store
    /// untouched.
    pub fn insert_with<F>(&self, new: NewDocument, commit: F) -> Result<ContentDocument>
    where
        F: FnOnce(&ContentDocument) -> Result<()>,
    {
        let mut inner = self.inner.write();
        let key = (new.kind.clone(), new.title.clone());
        if inner.titles.contains_key(&key) {
            return Err(FolioError::Conflict(format!(
                "title '{}' already exists in {}",
                new.title, new.kind
            )));
        }
        let seq = inner.last_seq + 1;
        let doc = ContentDocument::new_with_seq(new, seq);
        commit(&doc)?;
        inner.index(doc.clone());
        Ok(doc)
    }

    pub fn all_documents(&self) -> Vec<ContentDocument> {
        self.inner.read().docs.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl Storage for InMemoryStore {
    async fn insert(&self, new: NewDocument) -> Result<ContentDocument> {
        self.insert_with(new, |_| Ok(()))
    }

    async fn find_by_title(&self, kind: &str, title: &str) -> Result<Option<ContentDocument>> {
        let inner = self.inner.read();
        let found = inner
            .titles
            .get(&(kind.to_string(), title.to_string()))
            .and_then(|seq| inner.docs.get(seq))
            .cloned();
        Ok(found)
    }

    async fn query(&self, req: &ListQuery) -> Result<Vec<ContentDocument>> {
        let inner = self.inner.read();
        let Some(seqs) = inner.by_kind.get(&req.kind) else {
            return Ok(vec![]);
        };
        let mut out: Vec<&ContentDocument> = seqs
            .iter()
            .filter_map(|seq| inner.docs.get(seq))
            .filter(|d| req.matches(d))
            .collect();
        out.sort_by(|a, b| req.sort.compare(a, b));
        Ok(out
            .into_iter()
            .skip(req.window.skip)
            .take(req.window.limit)
            .cloned()
            .collect())
    }
}
