//! Raw response types of the content API.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `link_type` marker of a reference to another document.
pub const DOCUMENT_LINK_TYPE: &str = "Document";

/// Format of `first_publication_date` / `last_publication_date` values.
pub const PUBLICATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Translation of a document into another language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternateLanguage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub lang: String,
}

/// One document as returned by the API.
///
/// Top level keys are the document *attributes*; `data` holds the custom
/// fields of its content type. Keys this struct does not model are kept in
/// `extra` so nothing the API sent is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slugs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publication_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_publication_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default)]
    pub alternate_languages: Vec<AlternateLanguage>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawDocument {
    /// Minimal document of the given type, mostly useful in tests.
    pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uid: None,
            content_type: content_type.into(),
            href: None,
            tags: Vec::new(),
            slugs: Vec::new(),
            first_publication_date: None,
            last_publication_date: None,
            lang: None,
            alternate_languages: Vec::new(),
            data: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// A top level attribute by its API name.
    ///
    /// Returns `None` for attributes the document does not carry.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" if !self.id.is_empty() => Some(Value::String(self.id.clone())),
            "id" => None,
            "uid" => self.uid.clone().map(Value::String),
            "type" => Some(Value::String(self.content_type.clone())),
            "href" => self.href.clone().map(Value::String),
            "tags" => Some(string_list(&self.tags)),
            "slugs" => Some(string_list(&self.slugs)),
            "first_publication_date" => self.first_publication_date.clone().map(Value::String),
            "last_publication_date" => self.last_publication_date.clone().map(Value::String),
            "lang" => self.lang.clone().map(Value::String),
            "alternate_languages" => serde_json::to_value(&self.alternate_languages).ok(),
            "data" => Some(Value::Object(self.data.clone())),
            other => self.extra.get(other).cloned(),
        }
    }

    /// A custom field from `data`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn first_published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.first_publication_date.as_deref().and_then(parse_publication_date)
    }

    pub fn last_published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.last_publication_date.as_deref().and_then(parse_publication_date)
    }
}

fn string_list(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

fn parse_publication_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, PUBLICATION_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

/// A content relation field value pointing at another document.
///
/// When the query asked the API to inline the target (`fetchLinks`), the
/// reference carries its own `data` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationReference {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    #[serde(rename = "isBroken", default)]
    pub is_broken: Option<bool>,
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl RelationReference {
    /// Parse a field value; `None` when the value is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// A reference can be followed when it is a non broken document link with an id.
    pub fn is_resolvable(&self) -> bool {
        let has_id = self.id.as_deref().is_some_and(|id| !id.is_empty());
        let is_document_link = self
            .link_type
            .as_deref()
            .map_or(true, |link_type| link_type == DOCUMENT_LINK_TYPE);

        has_id && is_document_link && self.is_broken == Some(false)
    }

    /// The target document was already inlined by the API.
    pub fn is_eager_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// The inlined target as a document; `None` unless eagerly loaded.
    pub fn to_document(&self) -> Option<RawDocument> {
        let data = self.data.as_ref()?;
        let mut document = RawDocument::new(
            self.id.clone().unwrap_or_default(),
            self.content_type.clone().unwrap_or_default(),
        );
        document.uid = self.uid.clone();
        document.lang = self.lang.clone();
        document.data = data.clone();
        Some(document)
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    #[serde(default)]
    pub results: Vec<RawDocument>,
    #[serde(default)]
    pub results_size: usize,
    #[serde(default)]
    pub total_results_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_per_page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
}

impl ResultPage {
    pub fn new(results: Vec<RawDocument>, total_results_size: usize) -> Self {
        Self {
            results_size: results.len(),
            results,
            total_results_size,
            page: None,
            results_per_page: None,
            total_pages: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// More documents match than this page holds.
    pub fn has_more(&self) -> bool {
        self.total_results_size > self.results_size
    }
}
