//! In-memory content repository for tests.
//!
//! [`MockApi`] evaluates the predicate vocabulary against a fixed set of
//! documents and records every call, so tests can assert how many round
//! trips an operation made and with which arguments.
//!
//! # Example
//! ```ignore
//! use prismic_client::testing::{MockApi, RecordedCall};
//!
//! let api = MockApi::new(vec![RawDocument::new("A1", "article")]);
//! let page = api.query(&[Predicate::at("document.type", "article")], &QueryOptions::default()).await?;
//! assert_eq!(api.calls().len(), 1);
//! ```

use std::{
    cmp::Ordering,
    sync::{Mutex, MutexGuard},
};

use chrono::Datelike;
use itertools::Itertools;
use serde_json::Value;

use crate::{
    ApiError, ApiResult, ContentApi, Operator, Predicate, QueryOptions, RawDocument, ResultPage,
};

/// Page size the mock uses when a query does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One call received by a [`MockApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Query {
        predicates: Vec<Predicate>,
        options: QueryOptions,
    },
    GetById {
        id: String,
        options: QueryOptions,
    },
    GetByUid {
        content_type: String,
        uid: String,
        options: QueryOptions,
    },
    GetByIds {
        ids: Vec<String>,
        options: QueryOptions,
    },
    GetSingle {
        content_type: String,
        options: QueryOptions,
    },
}

impl RecordedCall {
    /// The page requested by a query call.
    pub fn page(&self) -> Option<usize> {
        match self {
            RecordedCall::Query { options, .. } => options.page,
            _ => None,
        }
    }

    pub fn is_bulk_fetch(&self) -> bool {
        matches!(self, RecordedCall::GetByIds { .. })
    }
}

/// Content repository backed by a vector of documents.
#[derive(Debug)]
pub struct MockApi {
    documents: Vec<RawDocument>,
    default_page_size: usize,
    calls: Mutex<Vec<RecordedCall>>,
    failure: Mutex<Option<String>>,
}

impl MockApi {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self {
            documents,
            default_page_size: DEFAULT_PAGE_SIZE,
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Build from JSON fixtures; panics on malformed fixtures.
    pub fn from_json(documents: Vec<Value>) -> Self {
        Self::new(
            documents
                .into_iter()
                .map(|doc| RawDocument::from_value(doc).expect("invalid document fixture"))
                .collect(),
        )
    }

    /// Page size used when a query does not set `pageSize`.
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    /// Make every following call fail with the given message.
    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.failure) = Some(message.into());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn bulk_fetches(&self) -> Vec<Vec<String>> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                RecordedCall::GetByIds { ids, .. } => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: RecordedCall) -> ApiResult<()> {
        lock(&self.calls).push(call);
        match lock(&self.failure).as_ref() {
            Some(message) => Err(ApiError::Other(anyhow::anyhow!(message.clone()))),
            None => Ok(()),
        }
    }

    fn search(&self, predicates: &[Predicate], options: &QueryOptions) -> ResultPage {
        let mut matching: Vec<&RawDocument> = self
            .documents
            .iter()
            .filter(|doc| language_matches(doc, options.lang.as_deref()))
            .filter(|doc| predicates.iter().all(|p| evaluate(doc, p)))
            .collect();

        if let Some(orderings) = &options.orderings {
            sort_documents(&mut matching, orderings);
        }

        let page_size = options.page_size.unwrap_or(self.default_page_size).max(1);
        let page = options.page.unwrap_or(1).max(1);
        let total = matching.len();

        let results: Vec<RawDocument> = matching
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();

        ResultPage {
            results_size: results.len(),
            results,
            total_results_size: total,
            page: Some(page),
            results_per_page: Some(page_size),
            total_pages: Some(total.div_ceil(page_size)),
        }
    }
}

#[async_trait::async_trait]
impl ContentApi for MockApi {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> ApiResult<ResultPage> {
        self.record(RecordedCall::Query {
            predicates: predicates.to_vec(),
            options: options.clone(),
        })?;
        Ok(self.search(predicates, options))
    }

    async fn get_by_id(&self, id: &str, options: &QueryOptions) -> ApiResult<Option<RawDocument>> {
        self.record(RecordedCall::GetById {
            id: id.to_string(),
            options: options.clone(),
        })?;
        Ok(self
            .search(&[Predicate::at("document.id", id)], options)
            .results
            .into_iter()
            .next())
    }

    async fn get_by_uid(
        &self,
        content_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> ApiResult<Option<RawDocument>> {
        self.record(RecordedCall::GetByUid {
            content_type: content_type.to_string(),
            uid: uid.to_string(),
            options: options.clone(),
        })?;
        let predicates = [
            Predicate::at("document.type", content_type),
            Predicate::at("document.uid", uid),
        ];
        Ok(self.search(&predicates, options).results.into_iter().next())
    }

    async fn get_by_ids(&self, ids: &[String], options: &QueryOptions) -> ApiResult<ResultPage> {
        self.record(RecordedCall::GetByIds {
            ids: ids.to_vec(),
            options: options.clone(),
        })?;
        Ok(self.search(&[Predicate::any("document.id", ids.to_vec())], options))
    }

    async fn get_single(
        &self,
        content_type: &str,
        options: &QueryOptions,
    ) -> ApiResult<Option<RawDocument>> {
        self.record(RecordedCall::GetSingle {
            content_type: content_type.to_string(),
            options: options.clone(),
        })?;
        Ok(self
            .search(&[Predicate::at("document.type", content_type)], options)
            .results
            .into_iter()
            .next())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn language_matches(doc: &RawDocument, lang: Option<&str>) -> bool {
    match lang {
        None | Some("*") => true,
        Some(lang) => doc.lang.as_deref() == Some(lang),
    }
}

/// Value a predicate path points at inside a document.
fn resolve_path(doc: &RawDocument, path: &str) -> Option<Value> {
    if let Some(attribute) = path.strip_prefix("document.") {
        return doc.attribute(attribute);
    }

    let mut parts = path.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("my"), Some(content_type), Some("uid")) if content_type == doc.content_type => {
            doc.field("uid").cloned().or_else(|| doc.attribute("uid"))
        }
        (Some("my"), Some(content_type), Some(field)) if content_type == doc.content_type => {
            doc.field(field).cloned()
        }
        _ => None,
    }
}

fn evaluate(doc: &RawDocument, predicate: &Predicate) -> bool {
    if predicate.operator == Operator::Fulltext {
        let needle = predicate.operand.as_str().unwrap_or_default().to_lowercase();
        return contains_text(&Value::Object(doc.data.clone()), &needle);
    }

    let value = resolve_path(doc, &predicate.path);

    match predicate.operator {
        Operator::At => value.is_some_and(|v| matches_at(&v, &predicate.operand)),
        Operator::Not => !value.is_some_and(|v| matches_at(&v, &predicate.operand)),
        Operator::Any => value.is_some_and(|v| matches_any(&v, &predicate.operand)),
        Operator::DateMonth => date_part(value.as_ref(), |d| i64::from(d.month()))
            .is_some_and(|month| Some(month) == predicate.operand.as_i64()),
        Operator::DateYear => date_part(value.as_ref(), |d| i64::from(d.year()))
            .is_some_and(|year| Some(year) == predicate.operand.as_i64()),
        Operator::Fulltext => false,
    }
}

fn matches_at(value: &Value, operand: &Value) -> bool {
    match (value, operand) {
        (Value::Array(have), Value::Array(want)) => want.iter().all(|w| have.contains(w)),
        (Value::Array(have), scalar) => have.contains(scalar),
        (scalar, other) => scalar == other,
    }
}

fn matches_any(value: &Value, operand: &Value) -> bool {
    let Value::Array(candidates) = operand else {
        return matches_at(value, operand);
    };

    match value {
        Value::Array(have) => have.iter().any(|v| candidates.contains(v)),
        scalar => candidates.contains(scalar),
    }
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(text) => text.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|item| contains_text(item, needle)),
        Value::Object(map) => map.values().any(|item| contains_text(item, needle)),
        _ => false,
    }
}

fn date_part(
    value: Option<&Value>,
    part: impl Fn(&chrono::DateTime<chrono::FixedOffset>) -> i64,
) -> Option<i64> {
    let text = value?.as_str()?;
    chrono::DateTime::parse_from_str(text, crate::PUBLICATION_DATE_FORMAT)
        .ok()
        .map(|date| part(&date))
}

/// Sort by the first ordering of `[path]` / `[path desc]`.
fn sort_documents(documents: &mut [&RawDocument], orderings: &str) {
    let Some(first) = orderings
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .find(|o| !o.is_empty())
    else {
        return;
    };

    let (path, descending) = match first.split_whitespace().collect_vec().as_slice() {
        [path, "desc"] => (path.to_string(), true),
        [path, ..] => (path.to_string(), false),
        [] => return,
    };

    documents.sort_by(|a, b| {
        let ordering = compare_values(resolve_path(a, &path), resolve_path(b, &path));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare_values(a: Option<Value>, b: Option<Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
