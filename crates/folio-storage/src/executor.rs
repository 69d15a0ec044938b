use crate::traits::Storage;
use folio_core::{compose, ContentDocument, FolioError, ListQuery, QueryParams, Resource, Result};
use serde::Serialize;
use tracing::info;

/// One page of a successful list query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub count: usize,
    pub items: Vec<ContentDocument>,
    pub page: usize,
    pub page_size: usize,
    pub skip: usize,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Found(Page),
    Empty,
}

/// Runs a composed query against a store exactly once.
pub struct PipelineExecutor<'s, S: Storage + ?Sized> {
    store: &'s S,
}

impl<'s, S: Storage + ?Sized> PipelineExecutor<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Store failures come back unmodified; an empty result is `Outcome::Empty`.
    pub async fn execute(&self, query: ListQuery) -> Result<Outcome> {
        let items = self.store.query(&query).await?;
        if items.is_empty() {
            return Ok(Outcome::Empty);
        }
        Ok(Outcome::Found(Page {
            count: items.len(),
            items,
            page: query.window.page,
            page_size: query.window.limit,
            skip: query.window.skip,
        }))
    }

    /// Composes, executes and maps an empty result to the resource's `NotFound`.
    pub async fn list<R: Resource + ?Sized>(
        &self,
        resource: &R,
        params: &QueryParams,
        max_page_size: usize,
    ) -> Result<Page> {
        let query = compose(resource, params, max_page_size)?;
        match self.execute(query).await? {
            Outcome::Found(page) => {
                info!(kind = resource.kind(), count = page.count, skip = page.skip, "list query");
                Ok(page)
            }
            Outcome::Empty => {
                info!(kind = resource.kind(), "list query matched nothing");
                Err(FolioError::NotFound(resource.not_found_message().to_string()))
            }
        }
    }
}
