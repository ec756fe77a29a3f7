//! Query options sent alongside predicates.

use serde::{Deserialize, Serialize};

/// Sort direction for an `orderings` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Render `[<path>]` or `[<path> desc]`.
    ///
    /// Ascending order is the API default and carries no keyword.
    pub fn ordering(&self, path: &str) -> String {
        match self {
            SortDirection::Asc => format!("[{}]", path),
            SortDirection::Desc => format!("[{} desc]", path),
        }
    }
}

/// Named options of a content query.
///
/// Setting an option twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_links: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Copy of these options pointing at another page.
    pub fn with_page(&self, page: usize) -> Self {
        self.clone().page(page)
    }

    /// Option pairs in their wire spelling, in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize", page_size.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(lang) = &self.lang {
            pairs.push(("lang", lang.clone()));
        }
        if let Some(orderings) = &self.orderings {
            pairs.push(("orderings", orderings.clone()));
        }
        if let Some(fetch) = &self.fetch {
            pairs.push(("fetch", fetch.clone()));
        }
        if let Some(fetch_links) = &self.fetch_links {
            pairs.push(("fetchLinks", fetch_links.clone()));
        }
        pairs
    }
}
