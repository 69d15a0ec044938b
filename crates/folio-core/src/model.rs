use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::collections::BTreeMap;
use ulid::Ulid;

pub type DocumentId = String; // ULID string
pub type Revision = String; // blake3 hex

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRef {
    pub public_id: String,
    pub url: String,
}

/// Image sources as clients send them: a bare string or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ImageInput {
    One(String),
    Many(Vec<String>),
}

impl ImageInput {
    /// Ordered list of non-blank sources.
    pub fn into_sources(self) -> Vec<String> {
        let all = match self {
            ImageInput::One(s) => vec![s],
            ImageInput::Many(v) => v,
        };
        all.into_iter().filter(|s| !s.trim().is_empty()).collect()
    }
}

/// A persisted piece of content. The pipeline only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub id: DocumentId,
    pub kind: String,
    pub seq: u64, // monotonic per store, insertion order
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub revision: Revision,
    #[serde(default, flatten)]
    pub attributes: BTreeMap<String, JsonValue>,
}

/// Everything the create workflow has validated, sanitized and uploaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDocument {
    pub kind: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attributes: BTreeMap<String, JsonValue>,
}

impl ContentDocument {
    pub fn new_with_seq(new: NewDocument, seq: u64) -> Self {
        let id = Ulid::new().to_string();
        let created_at = new.created_at.unwrap_or_else(Utc::now);
        let mut seed = format!("{}:{}:{}:{}", new.kind, id, new.title, created_at.to_rfc3339());
        seed.push_str(&new.content);
        seed.push_str(&serde_json::to_string(&new.attributes).unwrap_or_default());
        let revision = blake3::hash(seed.as_bytes()).to_hex().to_string();
        Self {
            id,
            kind: new.kind,
            seq,
            title: new.title,
            content: new.content,
            author: new.author,
            images: new.images,
            created_at,
            revision,
            attributes: new.attributes,
        }
    }

    /// Resolves a field by its wire name. Built-in fields come first, then
    /// free-form attributes, where `a.b` descends into nested objects.
    pub fn field(&self, name: &str) -> Option<Cow<'_, JsonValue>> {
        let owned = |v: JsonValue| Some(Cow::Owned(v));
        match name {
            "id" => owned(JsonValue::String(self.id.clone())),
            "kind" => owned(JsonValue::String(self.kind.clone())),
            "seq" => owned(JsonValue::from(self.seq)),
            "title" => owned(JsonValue::String(self.title.clone())),
            "content" => owned(JsonValue::String(self.content.clone())),
            "createdAt" | "created_at" => owned(JsonValue::String(
                self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            )),
            "author.name" => self
                .author
                .as_ref()
                .and_then(|a| owned(JsonValue::String(a.name.clone()))),
            "author.email" => self
                .author
                .as_ref()
                .and_then(|a| owned(JsonValue::String(a.email.clone()))),
            _ => {
                if let Some(v) = self.attributes.get(name) {
                    return Some(Cow::Borrowed(v));
                }
                let (head, rest) = name.split_once('.')?;
                self.attributes
                    .get(head)?
                    .pointer(&json_pointer_from_path(rest))
                    .map(Cow::Borrowed)
            }
        }
    }
}

fn json_pointer_from_path(path: &str) -> String {
    // a.b.c -> /a/b/c ; array indices are plain segments (items.0)
    let mut out = String::new();
    for part in path.split('.').filter(|p| !p.is_empty()) {
        out.push('/');
        out.push_str(&part.replace('~', "~0").replace('/', "~1"));
    }
    out
}

/// Wire names owned by [`ContentDocument`]; free-form attributes may not reuse them.
pub const BUILTIN_FIELDS: [&str; 10] = [
    "id", "kind", "seq", "title", "content", "author", "images", "createdAt", "created_at",
    "revision",
];

/// Create-workflow request body as clients send it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentRequest {
    #[serde(default, alias = "jobTitle")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorInput>,
    #[serde(default)]
    pub images: Option<ImageInput>,
    #[serde(default, alias = "publishedAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, flatten)]
    pub attributes: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewDocumentRequest {
    /// Drops attributes that would shadow a built-in document field.
    pub fn retain_free_attributes(&mut self) {
        self.attributes
            .retain(|k, _| !BUILTIN_FIELDS.contains(&k.as_str()));
    }

    /// True when the named field is present and non-blank.
    pub fn has(&self, field: &str) -> bool {
        fn filled(s: &Option<String>) -> bool {
            s.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
        }
        match field {
            "title" => filled(&self.title),
            "content" => filled(&self.content),
            "author.name" => self.author.as_ref().map(|a| filled(&a.name)).unwrap_or(false),
            "author.email" => self.author.as_ref().map(|a| filled(&a.email)).unwrap_or(false),
            other => match self.attributes.get(other) {
                None | Some(JsonValue::Null) => false,
                Some(JsonValue::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_with(attrs: JsonValue) -> ContentDocument {
        let attributes = serde_json::from_value(attrs).unwrap();
        ContentDocument::new_with_seq(
            NewDocument {
                kind: "events".into(),
                title: "Product Launch Event".into(),
                content: "<p>hi</p>".into(),
                author: Some(Author {
                    name: "Ada".into(),
                    email: "ada@example.com".into(),
                }),
                attributes,
                ..Default::default()
            },
            7,
        )
    }

    #[test]
    fn field_resolves_builtins_and_attributes() {
        let d = doc_with(json!({"price": 150, "venue": {"city": "Lisbon"}}));
        assert_eq!(d.field("title").unwrap().as_str(), Some("Product Launch Event"));
        assert_eq!(d.field("author.email").unwrap().as_str(), Some("ada@example.com"));
        assert_eq!(d.field("seq").unwrap().as_u64(), Some(7));
        assert_eq!(d.field("price").unwrap().as_f64(), Some(150.0));
        assert_eq!(d.field("venue.city").unwrap().as_str(), Some("Lisbon"));
        assert!(d.field("missing").is_none());
        assert!(d.field("venue.country").is_none());
    }

    #[test]
    fn attributes_flatten_on_the_wire() {
        let d = doc_with(json!({"category": "launch"}));
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["category"], "launch");
        assert!(v["createdAt"].is_string());
        let back: ContentDocument = serde_json::from_value(v).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn image_input_accepts_one_or_many() {
        let one: ImageInput = serde_json::from_value(json!("a.png")).unwrap();
        assert_eq!(one.into_sources(), vec!["a.png".to_string()]);
        let many: ImageInput = serde_json::from_value(json!(["a.png", " ", "b.png"])).unwrap();
        assert_eq!(many.into_sources(), vec!["a.png".to_string(), "b.png".to_string()]);
    }

    #[test]
    fn request_accepts_job_title_alias() {
        let req: NewDocumentRequest = serde_json::from_value(json!({
            "jobTitle": "Rust Engineer",
            "location": "Remote",
            "experience": "",
        }))
        .unwrap();
        assert_eq!(req.title.as_deref(), Some("Rust Engineer"));
        assert!(req.has("title"));
        assert!(req.has("location"));
        assert!(!req.has("experience"));
        assert!(!req.has("author.name"));
    }

    #[test]
    fn builtin_names_are_stripped_from_attributes() {
        let mut req: NewDocumentRequest = serde_json::from_value(json!({
            "title": "t",
            "seq": 99,
            "revision": "forged",
            "price": 10,
        }))
        .unwrap();
        req.retain_free_attributes();
        assert_eq!(req.attributes.len(), 1);
        assert!(req.attributes.contains_key("price"));
    }
}
