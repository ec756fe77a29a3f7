//! Fluent predicate and option builder.
//!
//! Chained calls accumulate [`Predicate`]s in call order and set
//! [`QueryOptions`] (last write wins). Field names are turned into API paths
//! by [`QueryBuilder::path`].
//!
//! # Example
//! ```ignore
//! let (predicates, options) = QueryBuilder::for_type("article")
//!     .filter("category", "news")
//!     .where_tag("featured")
//!     .order_by_desc("first_publication_date")
//!     .limit(5)
//!     .into_parts();
//! ```

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use prismic_client::{Predicate, QueryOptions, SortDirection};
use serde_json::Value;

use crate::{OrmError, OrmResult};

/// Top level document attributes; everything else lives under `data`.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
    "id",
    "uid",
    "type",
    "href",
    "tags",
    "first_publication_date",
    "last_publication_date",
    "linked_documents",
    "lang",
    "alternate_languages",
    "data",
];

/// Accumulated predicates and options of one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    content_type: Option<String>,
    predicates: Vec<Predicate>,
    options: QueryOptions,
}

impl QueryBuilder {
    /// Untyped builder. Non reserved field names are used as paths verbatim.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with `at(document.type, <content_type>)`.
    pub fn for_type(content_type: impl Into<String>) -> Self {
        Self::new().where_type(content_type)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn into_parts(self) -> (Vec<Predicate>, QueryOptions) {
        (self.predicates, self.options)
    }

    /// The API path of a field name.
    ///
    /// Reserved attribute names map to `document.<name>`, custom fields to
    /// `my.<type>.<name>`. Names that already are paths are kept.
    pub fn path(&self, field: &str) -> String {
        if field.starts_with("document.") || field.starts_with("my.") {
            return field.to_string();
        }
        if RESERVED_ATTRIBUTES.contains(&field) {
            return format!("document.{}", field);
        }
        match &self.content_type {
            Some(content_type) => format!("my.{}.{}", content_type, field),
            None => field.to_string(),
        }
    }

    /// `fetch`/`fetchLinks` entries: bare names get the content type prefix.
    fn field_list<I, S>(&self, fields: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .map(|field| {
                let field = field.as_ref();
                match (&self.content_type, field.contains('.')) {
                    (Some(content_type), false) => format!("{}.{}", content_type, field),
                    _ => field.to_string(),
                }
            })
            .join(",")
    }

    fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }
}

/// Chainable query methods for anything that carries a [`QueryBuilder`].
///
/// Implemented by [`QueryBuilder`] itself and by the executors
/// ([`ModelQuery`](crate::ModelQuery), [`DocumentQuery`](crate::DocumentQuery)).
pub trait BuildQuery: Sized {
    fn builder(&self) -> &QueryBuilder;

    fn builder_mut(&mut self) -> &mut QueryBuilder;

    /// `at(document.type, type)`. The first type given is also used to build
    /// custom field paths.
    fn where_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        let builder = self.builder_mut();
        if builder.content_type.is_none() {
            builder.content_type = Some(content_type.clone());
        }
        builder.push(Predicate::at("document.type", content_type));
        self
    }

    /// Equality filter; a list value matches any of its members.
    fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        let builder = self.builder_mut();
        let path = builder.path(field);
        let predicate = match value {
            Value::Array(_) => Predicate::any(path, value),
            value => Predicate::at(path, value),
        };
        builder.push(predicate);
        self
    }

    fn where_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let builder = self.builder_mut();
        let path = builder.path(field);
        builder.push(Predicate::any(path, values));
        self
    }

    fn where_not(mut self, field: &str, value: impl Into<Value>) -> Self {
        let builder = self.builder_mut();
        let path = builder.path(field);
        builder.push(Predicate::not(path, value));
        self
    }

    /// Documents carrying `tag`.
    fn where_tag(mut self, tag: impl Into<String>) -> Self {
        self.builder_mut()
            .push(Predicate::at("document.tags", vec![tag.into()]));
        self
    }

    /// Documents carrying any of `tags`.
    fn where_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        self.builder_mut().push(Predicate::any("document.tags", tags));
        self
    }

    fn where_language(mut self, lang: impl Into<String>) -> Self {
        self.builder_mut().options.lang = Some(lang.into());
        self
    }

    /// Full text search over the whole document.
    fn search(mut self, text: impl Into<String>) -> Self {
        self.builder_mut()
            .push(Predicate::fulltext("document", text));
        self
    }

    /// Documents first published in the month or year of `date`.
    ///
    /// `unit` is `"month"` or `"year"`, case insensitive.
    fn where_publication_date(mut self, date: NaiveDate, unit: &str) -> OrmResult<Self> {
        const PATH: &str = "document.first_publication_date";

        let predicate = match unit.to_ascii_lowercase().as_str() {
            "month" => Predicate::date_month(PATH, date.month()),
            "year" => Predicate::date_year(PATH, date.year()),
            other => {
                return Err(OrmError::invalid(format!(
                    "publication date unit must be `month` or `year`, got `{}`",
                    other
                )))
            }
        };
        self.builder_mut().push(predicate);
        Ok(self)
    }

    fn order_by(self, field: &str) -> Self {
        self.order_by_with(field, SortDirection::Asc)
    }

    fn order_by_desc(self, field: &str) -> Self {
        self.order_by_with(field, SortDirection::Desc)
    }

    fn order_by_with(mut self, field: &str, direction: SortDirection) -> Self {
        let builder = self.builder_mut();
        let ordering = direction.ordering(&builder.path(field));
        builder.options.orderings = Some(ordering);
        self
    }

    /// Ask the API to inline these fields of linked documents (`fetchLinks`).
    fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let builder = self.builder_mut();
        builder.options.fetch_links = Some(builder.field_list(fields));
        self
    }

    /// Restrict the returned fields (`fetch`).
    fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let builder = self.builder_mut();
        builder.options.fetch = Some(builder.field_list(fields));
        self
    }

    fn limit(mut self, page_size: usize) -> Self {
        self.builder_mut().options.page_size = Some(page_size);
        self
    }

    fn page(mut self, page: usize) -> Self {
        self.builder_mut().options.page = Some(page);
        self
    }
}

impl BuildQuery for QueryBuilder {
    fn builder(&self) -> &QueryBuilder {
        self
    }

    fn builder_mut(&mut self) -> &mut QueryBuilder {
        self
    }
}
