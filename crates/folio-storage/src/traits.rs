use folio_core::{ContentDocument, ListQuery, NewDocument, Result};

#[async_trait::async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Inserts a new document. Fails with `Conflict` when the kind already
    /// holds a document with the same title; the check and the write are atomic.
    async fn insert(&self, doc: NewDocument) -> Result<ContentDocument>;

    async fn find_by_title(&self, kind: &str, title: &str) -> Result<Option<ContentDocument>>;

    /// Evaluates the filters, ordering and window of a composed list query.
    async fn query(&self, req: &ListQuery) -> Result<Vec<ContentDocument>>;
}
