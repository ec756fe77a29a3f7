//! Paginated query results.

use derive_getters::Getters;

/// Options for [`ModelQuery::paginate`](crate::ModelQuery::paginate).
///
/// # Example
/// ```ignore
/// let page = Article::query()
///     .paginate(PaginateOpts::new().per_page(5).page(2))
///     .await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginateOpts {
    /// Page size; the model's `PER_PAGE` when not set
    pub per_page: Option<usize>,
    /// Restrict the returned fields, same as `select`
    pub fields: Vec<String>,
    /// Name of the page parameter, carried into the result for link building
    pub page_name: String,
    /// Page to fetch, starting at 1
    pub page: Option<usize>,
}

impl Default for PaginateOpts {
    fn default() -> Self {
        Self {
            per_page: None,
            fields: Vec::new(),
            page_name: "page".to_string(),
            page: None,
        }
    }
}

impl PaginateOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = page_name.into();
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

/// One page of models plus the counts needed to render pagination.
#[derive(Getters, Debug)]
pub struct Paginated<T> {
    /// models of the current page
    items: Vec<T>,
    /// number of documents matching the query, as reported by the API
    #[getter(skip)]
    total: usize,
    #[getter(skip)]
    per_page: usize,
    #[getter(skip)]
    current_page: usize,
    /// name of the page parameter
    page_name: String,
    /// number of documents on this page, as reported by the API
    #[getter(skip)]
    results_size: usize,
}

impl<T> Paginated<T> {
    pub fn new(
        items: Vec<T>,
        total: usize,
        per_page: usize,
        current_page: usize,
        page_name: impl Into<String>,
        results_size: usize,
    ) -> Self {
        Self {
            items,
            total,
            per_page,
            current_page,
            page_name: page_name.into(),
            results_size,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn results_size(&self) -> usize {
        self.results_size
    }

    /// Number of the last page; at least 1.
    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.per_page.max(1)).max(1)
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
