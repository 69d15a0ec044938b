//! Translates raw list parameters into a [`ListQuery`].
//!
//! Stages run in a fixed order: search, filter, sort, paginate. Reserved
//! parameters are split off before any stage runs, so the filter stage only
//! ever sees field parameters.

use crate::errors::Result;
use crate::params::{QueryParams, ReservedParams};
use crate::query::{FieldFilter, ListQuery, SortSpec, TitleMatch, Window, DEFAULT_MAX_PAGE_SIZE};
use crate::resource::Resource;
use tracing::debug;

pub struct QueryPipeline<'r, R: Resource + ?Sized> {
    resource: &'r R,
    reserved: ReservedParams,
    fields: Vec<(String, String)>,
    max_page_size: usize,
    query: ListQuery,
}

impl<'r, R: Resource + ?Sized> QueryPipeline<'r, R> {
    pub fn new(resource: &'r R, params: &QueryParams) -> Self {
        let (reserved, fields) = params.classify();
        Self {
            resource,
            reserved,
            fields,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            query: resource.base_query(),
        }
    }

    pub fn with_max_page_size(mut self, max: usize) -> Self {
        self.max_page_size = max;
        self
    }

    pub fn search(mut self) -> Result<Self> {
        let keyword = self.reserved.keyword.as_deref().map(str::trim).unwrap_or("");
        if !keyword.is_empty() {
            self.query.search = Some(TitleMatch::new(self.resource.title_field(), keyword)?);
        }
        Ok(self)
    }

    pub fn filter(mut self) -> Result<Self> {
        for (key, value) in &self.fields {
            self.query.filters.push(FieldFilter::parse(key, value)?);
        }
        Ok(self)
    }

    pub fn sort(mut self) -> Self {
        self.query.sort = SortSpec::parse(self.reserved.sort.as_deref());
        self
    }

    pub fn paginate(mut self) -> Self {
        self.query.window = Window::from_params(
            self.reserved.page.as_deref(),
            self.reserved.page_size.as_deref(),
            self.resource.default_page_size(),
            self.max_page_size,
        );
        self
    }

    pub fn build(self) -> ListQuery {
        debug!(
            kind = %self.query.kind,
            search = self.query.search.is_some(),
            filters = self.query.filters.len(),
            skip = self.query.window.skip,
            limit = self.query.window.limit,
            "composed list query"
        );
        self.query
    }
}

/// Runs every stage in order.
pub fn compose<R: Resource + ?Sized>(
    resource: &R,
    params: &QueryParams,
    max_page_size: usize,
) -> Result<ListQuery> {
    Ok(QueryPipeline::new(resource, params)
        .with_max_page_size(max_page_size)
        .search()?
        .filter()?
        .sort()
        .paginate()
        .build())
}
