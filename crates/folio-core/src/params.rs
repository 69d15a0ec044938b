//! Raw query-string parameters and their split into control and field parameters.

pub const KEYWORD: &str = "keyword";
pub const PAGE: &str = "page";
pub const PAGE_SIZE: &str = "page-size";
pub const SORT: &str = "sort";

/// Parameter names that steer the pipeline and are never field filters.
pub const RESERVED: [&str; 4] = [KEYWORD, PAGE, PAGE_SIZE, SORT];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Decoded query string, in request order. Repeated names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(pub Vec<(String, String)>);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedParams {
    pub keyword: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits into (reserved, field parameters). Reserved names match exactly
    /// and case-sensitively; for a repeated reserved name the first value wins.
    pub fn classify(&self) -> (ReservedParams, Vec<(String, String)>) {
        let mut reserved = ReservedParams::default();
        let mut fields = Vec::new();
        for (name, value) in &self.0 {
            let slot = match name.as_str() {
                KEYWORD => &mut reserved.keyword,
                PAGE => &mut reserved.page,
                PAGE_SIZE => &mut reserved.page_size,
                SORT => &mut reserved.sort,
                _ => {
                    fields.push((name.clone(), value.clone()));
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(value.clone());
            }
        }
        (reserved, fields)
    }
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
