//! Typed models backed by content documents.
//!
//! A model wraps one [`ModelDocument`], which owns the raw document returned
//! by the API plus a side table of related models filled in by relation
//! resolution. The raw document is never modified after it is attached.
//!
//! # Example
//! ```ignore
//! #[derive(Debug)]
//! struct Article(ModelDocument);
//!
//! impl Model for Article {
//!     const TYPE: &'static str = "article";
//!
//!     fn from_document(document: ModelDocument) -> Self { Article(document) }
//!     fn document(&self) -> &ModelDocument { &self.0 }
//!     fn document_mut(&mut self) -> &mut ModelDocument { &mut self.0 }
//!
//!     fn relation(name: &str) -> Option<RelationDescriptor> {
//!         match name {
//!             "author" => Some(RelationDescriptor::has_one("author", RelationTarget::model::<Author>())),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let articles = Article::query().with(["author"])?.all().await?;
//! ```

use std::{
    any::Any,
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
};

use chrono::{DateTime, FixedOffset};
use heck::SnakeCase;
use prismic_client::RawDocument;
use serde_json::Value;

use crate::{GlobalClient, ModelQuery, OrmError, OrmResult, QueryBuilder, RelationDescriptor};

/// A content type mapped to a Rust type.
pub trait Model: Send + Sync + Sized + 'static {
    /// The API content type name.
    const TYPE: &'static str;

    /// Page size used by [`paginate`](crate::ModelQuery::paginate) when none is given.
    const PER_PAGE: usize = 10;

    fn from_document(document: ModelDocument) -> Self;

    fn document(&self) -> &ModelDocument;

    fn document_mut(&mut self) -> &mut ModelDocument;

    /// The relation this model declares under `name`.
    fn relation(_name: &str) -> Option<RelationDescriptor> {
        None
    }

    /// Named query scope, applied by [`ModelQuery::scoped`].
    ///
    /// Fails with [`OrmError::InvalidArgument`] for a name the model does not declare.
    fn scope(name: &str, _builder: QueryBuilder) -> OrmResult<QueryBuilder> {
        Err(OrmError::invalid(format!(
            "{} declares no scope named `{}`",
            Self::TYPE,
            name
        )))
    }

    /// Derived values looked up by [`ModelExt::get`] before fields and attributes.
    fn computed(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// A model with its concrete type erased, as stored in relation slots.
pub trait AnyModel: Any + Send + Sync {
    fn content_type(&self) -> &'static str;

    fn model_document(&self) -> &ModelDocument;

    fn as_any(&self) -> &dyn Any;
}

impl<M: Model> AnyModel for M {
    fn content_type(&self) -> &'static str {
        M::TYPE
    }

    fn model_document(&self) -> &ModelDocument {
        self.document()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyModel {
    pub fn downcast_ref<M: Model>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }

    pub fn is<M: Model>(&self) -> bool {
        self.as_any().is::<M>()
    }
}

impl Debug for dyn AnyModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyModel")
            .field("type", &self.content_type())
            .field("id", &self.model_document().id())
            .finish()
    }
}

/// The document behind a model and the models its relations resolved to.
#[derive(Default)]
pub struct ModelDocument {
    raw: Option<RawDocument>,
    related: BTreeMap<String, Box<dyn AnyModel>>,
}

impl ModelDocument {
    pub fn new(raw: RawDocument) -> Self {
        Self {
            raw: Some(raw),
            related: BTreeMap::new(),
        }
    }

    /// A document with nothing attached yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind a raw document after construction, dropping any resolved relations.
    pub fn attach_document(&mut self, raw: RawDocument) {
        self.raw = Some(raw);
        self.related.clear();
    }

    pub fn raw(&self) -> Option<&RawDocument> {
        self.raw.as_ref()
    }

    pub fn into_raw(self) -> Option<RawDocument> {
        self.raw
    }

    pub fn is_loaded(&self) -> bool {
        self.raw.is_some()
    }

    pub fn id(&self) -> Option<&str> {
        self.raw
            .as_ref()
            .map(|raw| raw.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn uid(&self) -> Option<&str> {
        self.raw.as_ref()?.uid.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.raw.as_ref().map(|raw| raw.content_type.as_str())
    }

    pub fn tags(&self) -> &[String] {
        self.raw.as_ref().map_or(&[][..], |raw| raw.tags.as_slice())
    }

    pub fn lang(&self) -> Option<&str> {
        self.raw.as_ref()?.lang.as_deref()
    }

    pub fn first_published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.raw.as_ref()?.first_published_at()
    }

    pub fn last_published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.raw.as_ref()?.last_published_at()
    }

    /// A top level attribute (`id`, `type`, `tags`, ...).
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.raw.as_ref()?.attribute(name)
    }

    /// Whether the attribute is present and not empty.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some_and(|value| !is_empty_value(&value))
    }

    /// A custom field from the document's `data`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.raw.as_ref()?.field(name)
    }

    /// Whether the field is present and not empty.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some_and(|value| !is_empty_value(value))
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name)?.as_str()
    }

    pub fn field_bool(&self, name: &str) -> Option<bool> {
        self.field(name)?.as_bool()
    }

    pub fn field_i64(&self, name: &str) -> Option<i64> {
        self.field(name)?.as_i64()
    }

    pub fn field_f64(&self, name: &str) -> Option<f64> {
        self.field(name)?.as_f64()
    }

    /// The value at a slot path inside `data`, e.g. `/items/0/link`.
    pub fn value_at(&self, slot: &str) -> Option<&Value> {
        let data = &self.raw.as_ref()?.data;
        let rest = slot.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(index) => (&rest[..index], &rest[index..]),
            None => (rest, ""),
        };
        let value = data.get(&unescape_segment(head))?;
        if tail.is_empty() {
            Some(value)
        } else {
            value.pointer(tail)
        }
    }

    pub fn is_resolved(&self, slot: &str) -> bool {
        self.related.contains_key(slot)
    }

    /// The model a relation slot resolved to.
    pub fn resolved(&self, slot: &str) -> Option<&(dyn AnyModel + 'static)> {
        self.related.get(slot).map(|model| model.as_ref())
    }

    /// The model a relation slot resolved to, when it is an `M`.
    pub fn related<M: Model>(&self, slot: &str) -> Option<&M> {
        self.resolved(slot)?.downcast_ref::<M>()
    }

    /// Resolved models of a relation in slot order.
    pub fn related_slots(&self, descriptor: &RelationDescriptor) -> Vec<&(dyn AnyModel + 'static)> {
        let Some(raw) = &self.raw else {
            return Vec::new();
        };
        descriptor
            .slots(&raw.data)
            .iter()
            .filter_map(|slot| self.resolved(slot))
            .collect()
    }

    /// Resolved models of a relation that are `M`s, in slot order.
    pub fn related_all<M: Model>(&self, descriptor: &RelationDescriptor) -> Vec<&M> {
        self.related_slots(descriptor)
            .into_iter()
            .filter_map(|model| model.downcast_ref::<M>())
            .collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.related.len()
    }

    pub(crate) fn set_resolved(&mut self, slot: String, model: Box<dyn AnyModel>) {
        self.related.insert(slot, model);
    }
}

impl Debug for ModelDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDocument")
            .field("raw", &self.raw)
            .field("related", &self.related.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Query entry points and dynamic lookups for every [`Model`].
pub trait ModelExt: Model {
    /// A query seeded with this model's content type, run against the global client.
    fn query() -> ModelQuery<Self, GlobalClient> {
        ModelQuery::new()
    }

    /// Look up `key` as a computed value, then a field, then an attribute.
    ///
    /// camelCase keys fall back to their snake_case spelling.
    fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.computed(key) {
            return Some(value);
        }
        let document = self.document();
        let lookup = |key: &str| {
            document
                .field(key)
                .cloned()
                .or_else(|| document.attribute(key))
        };

        lookup(key).or_else(|| {
            let snake = key.to_snake_case();
            if snake != key {
                lookup(&snake)
            } else {
                None
            }
        })
    }
}

impl<M: Model> ModelExt for M {}
