//! Content kinds served by the list pipeline and the create workflow.

use crate::errors::{FolioError, Result};
use crate::model::NewDocumentRequest;
use crate::query::{ListQuery, DEFAULT_PAGE_SIZE};

/// What the generic pipeline needs to know about one content kind.
pub trait Resource: Send + Sync {
    /// Store-level kind; every query for this resource starts from it.
    fn kind(&self) -> &str;
    /// Singular human label, e.g. "Event post".
    fn label(&self) -> &str;
    fn title_field(&self) -> &str {
        "title"
    }
    fn default_page_size(&self) -> usize {
        DEFAULT_PAGE_SIZE
    }
    fn not_found_message(&self) -> &str;
    fn upload_folder(&self) -> &str;
    fn required_fields(&self) -> &[&str];

    fn base_query(&self) -> ListQuery {
        ListQuery::new(self.kind())
    }

    fn check_required(&self, req: &NewDocumentRequest) -> Result<()> {
        if self.required_fields().iter().all(|f| req.has(f)) {
            Ok(())
        } else {
            Err(FolioError::Invalid(
                "Please fill in all required fields".into(),
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub kind: &'static str,
    pub label: &'static str,
    pub title_field: &'static str,
    pub default_page_size: usize,
    pub not_found: &'static str,
    pub upload_folder: &'static str,
    pub required: &'static [&'static str],
}

impl Resource for ResourceSpec {
    fn kind(&self) -> &str {
        self.kind
    }
    fn label(&self) -> &str {
        self.label
    }
    fn title_field(&self) -> &str {
        self.title_field
    }
    fn default_page_size(&self) -> usize {
        self.default_page_size
    }
    fn not_found_message(&self) -> &str {
        self.not_found
    }
    fn upload_folder(&self) -> &str {
        self.upload_folder
    }
    fn required_fields(&self) -> &[&str] {
        self.required
    }
}

const AUTHORED: &[&str] = &["title", "content", "author.name", "author.email"];

pub const BLOGS: ResourceSpec = ResourceSpec {
    kind: "blogs",
    label: "Blog post",
    title_field: "title",
    default_page_size: DEFAULT_PAGE_SIZE,
    not_found: "No blog posts found",
    upload_folder: "blogs",
    required: AUTHORED,
};

pub const NEWS: ResourceSpec = ResourceSpec {
    kind: "news",
    label: "News post",
    title_field: "title",
    default_page_size: DEFAULT_PAGE_SIZE,
    not_found: "No news found",
    upload_folder: "news",
    required: AUTHORED,
};

pub const EVENTS: ResourceSpec = ResourceSpec {
    kind: "events",
    label: "Event post",
    title_field: "title",
    default_page_size: DEFAULT_PAGE_SIZE,
    not_found: "No events found",
    upload_folder: "events",
    required: AUTHORED,
};

pub const CAREERS: ResourceSpec = ResourceSpec {
    kind: "careers",
    label: "Career post",
    title_field: "title",
    default_page_size: DEFAULT_PAGE_SIZE,
    not_found: "No career posts found",
    upload_folder: "careers",
    required: &["title", "location", "experience", "content"],
};

pub const GUIDES: ResourceSpec = ResourceSpec {
    kind: "guides",
    label: "Guide post",
    title_field: "title",
    default_page_size: DEFAULT_PAGE_SIZE,
    not_found: "No guides found",
    upload_folder: "guides",
    required: AUTHORED,
};

pub const BUILTIN: [ResourceSpec; 5] = [BLOGS, NEWS, EVENTS, CAREERS, GUIDES];

/// Looks a resource up by kind.
pub fn lookup(kind: &str) -> Result<&'static ResourceSpec> {
    static ALL: [ResourceSpec; 5] = BUILTIN;
    ALL.iter()
        .find(|r| r.kind == kind)
        .ok_or_else(|| FolioError::UnknownKind(kind.to_string()))
}
