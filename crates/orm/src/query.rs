//! Query executors.
//!
//! [`ModelQuery`] runs a [`QueryBuilder`] through a content API and turns the
//! returned documents into models, resolving the relations requested with
//! [`with`](ModelQuery::with). [`DocumentQuery`] is the untyped variant that
//! returns raw documents.
//!
//! # Example
//! ```ignore
//! use prismic_orm::prelude::*;
//!
//! let articles = Article::query()
//!     .filter("category", "news")
//!     .order_by_desc("first_publication_date")
//!     .with(["author"])?
//!     .all()
//!     .await?;
//!
//! let page = Article::query().paginate(PaginateOpts::new().per_page(5)).await?;
//! ```

use std::{marker::PhantomData, time::Instant};

use prismic_client::{
    ContentApi, Predicate, QueryOptions, RawDocument, ResultPage, MAX_PAGE_SIZE,
};
use tap::TapFallible;
use tracing::{debug, instrument, warn};

use crate::{
    BuildQuery, ClientProvider, GlobalClient, Model, ModelDocument, OrmError, OrmResult,
    PaginateOpts, Paginated, QueryBuilder, RelationDescriptor, RelationResolver,
};

/// A typed query for models of type `M`, run against the provider `C`.
pub struct ModelQuery<M, C = GlobalClient> {
    builder: QueryBuilder,
    relations: Vec<RelationDescriptor>,
    client: C,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> ModelQuery<M, GlobalClient> {
    /// Query seeded with `at(document.type, M::TYPE)`.
    pub fn new() -> Self {
        Self {
            builder: QueryBuilder::for_type(M::TYPE),
            relations: Vec::new(),
            client: GlobalClient,
            _model: PhantomData,
        }
    }
}

impl<M: Model> Default for ModelQuery<M, GlobalClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model, C: ClientProvider> ModelQuery<M, C> {
    /// Run against another API provider.
    pub fn with_client<C2: ClientProvider>(self, client: C2) -> ModelQuery<M, C2> {
        ModelQuery {
            builder: self.builder,
            relations: self.relations,
            client,
            _model: PhantomData,
        }
    }

    /// Resolve these declared relations on every returned model.
    ///
    /// Fails with [`OrmError::InvalidArgument`] for a name `M` does not declare.
    pub fn with<I, S>(mut self, names: I) -> OrmResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if self.relations.iter().any(|r| r.name == name) {
                continue;
            }
            let descriptor = M::relation(name).ok_or_else(|| {
                OrmError::invalid(format!("{} declares no relation named `{}`", M::TYPE, name))
            })?;
            self.relations.push(descriptor);
        }
        Ok(self)
    }

    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    /// Apply the query scope `M` declares under `name`.
    pub fn scoped(mut self, name: &str) -> OrmResult<Self> {
        self.builder = M::scope(name, self.builder)?;
        Ok(self)
    }

    fn api(&self) -> &dyn ContentApi {
        self.client.api()
    }

    /// The model with this uid, `None` when there is none.
    #[instrument(name = "prismic.orm.find", skip(self), fields(model = M::TYPE), err)]
    pub async fn find(&self, uid: &str) -> OrmResult<Option<M>> {
        let document = lookup(
            self.api(),
            self.builder.predicates(),
            Predicate::at("document.uid", uid),
            self.builder.options(),
        )
        .await?;
        self.materialize_one(document).await
    }

    #[instrument(name = "prismic.orm.find_by_id", skip(self), fields(model = M::TYPE), err)]
    pub async fn find_by_id(&self, id: &str) -> OrmResult<Option<M>> {
        let document = lookup(
            self.api(),
            self.builder.predicates(),
            Predicate::at("document.id", id),
            self.builder.options(),
        )
        .await?;
        self.materialize_one(document).await
    }

    /// Models for these ids, fetched with one bulk call. No call at all for no ids.
    ///
    /// The accumulated predicates still apply, so ids of other content types
    /// are left out.
    #[instrument(name = "prismic.orm.find_by_ids", skip(self, ids), fields(model = M::TYPE), err)]
    pub async fn find_by_ids<I, S>(&self, ids: I) -> OrmResult<Vec<M>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let documents = fetch_by_ids(
            self.api(),
            self.builder.predicates(),
            &ids,
            self.builder.options(),
        )
        .await?;
        self.materialize(documents).await
    }

    /// The document of a singleton content type.
    #[instrument(name = "prismic.orm.single", skip(self), err)]
    pub async fn single(&self, type_name: &str) -> OrmResult<Option<M>> {
        let document = self
            .api()
            .get_single(type_name, self.builder.options())
            .await?;
        self.materialize_one(document).await
    }

    /// [`single`](Self::single) for `M`'s own content type.
    pub async fn single_of_model(&self) -> OrmResult<Option<M>> {
        self.single(M::TYPE).await
    }

    /// Every matching model, following pagination until the last page.
    #[instrument(name = "prismic.orm.all", skip(self), fields(model = M::TYPE), err)]
    pub async fn all(&self) -> OrmResult<Vec<M>> {
        let documents = fetch_all(self.api(), self.builder.predicates(), self.builder.options())
            .await?;
        self.materialize(documents).await
    }

    /// One page of models.
    #[instrument(name = "prismic.orm.paginate", skip(self, opts), fields(model = M::TYPE), err)]
    pub async fn paginate(&self, opts: PaginateOpts) -> OrmResult<Paginated<M>> {
        let per_page = opts.per_page.unwrap_or(M::PER_PAGE);
        let current_page = opts.page.unwrap_or(1);

        let mut builder = self.builder.clone().limit(per_page).page(current_page);
        if !opts.fields.is_empty() {
            builder = builder.select(&opts.fields);
        }
        let (predicates, options) = builder.into_parts();

        let page = self.api().query(&predicates, &options).await?;
        let total = page.total_results_size;
        let results_size = page.results_size;
        let items = self.materialize(page.results).await?;

        Ok(Paginated::new(
            items,
            total,
            per_page,
            current_page,
            opts.page_name,
            results_size,
        ))
    }

    /// The first matching model.
    #[instrument(name = "prismic.orm.first", skip(self), fields(model = M::TYPE), err)]
    pub async fn first(&self) -> OrmResult<Option<M>> {
        let options = QueryOptions {
            page_size: Some(1),
            ..self.builder.options().clone()
        };
        let page = self.api().query(self.builder.predicates(), &options).await?;
        self.materialize_one(page.results.into_iter().next()).await
    }

    async fn materialize_one(&self, document: Option<RawDocument>) -> OrmResult<Option<M>> {
        match document {
            Some(document) => Ok(self.materialize(vec![document]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Wrap documents into models and resolve the requested relations across all of them.
    async fn materialize(&self, documents: Vec<RawDocument>) -> OrmResult<Vec<M>> {
        let mut models: Vec<M> = documents
            .into_iter()
            .map(|document| M::from_document(ModelDocument::new(document)))
            .collect();

        if !models.is_empty() && !self.relations.is_empty() {
            RelationResolver::new(self.api())
                .resolve_all(&mut models, &self.relations)
                .await?;
        }

        Ok(models)
    }
}

impl<M, C> BuildQuery for ModelQuery<M, C> {
    fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut QueryBuilder {
        &mut self.builder
    }
}

/// An untyped query returning raw documents.
pub struct DocumentQuery<C = GlobalClient> {
    builder: QueryBuilder,
    client: C,
}

impl DocumentQuery<GlobalClient> {
    pub fn new() -> Self {
        Self {
            builder: QueryBuilder::new(),
            client: GlobalClient,
        }
    }
}

impl Default for DocumentQuery<GlobalClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClientProvider> DocumentQuery<C> {
    pub fn with_client<C2: ClientProvider>(self, client: C2) -> DocumentQuery<C2> {
        DocumentQuery {
            builder: self.builder,
            client,
        }
    }

    /// Documents for these ids with one bulk call.
    #[instrument(name = "prismic.documents.find_by_ids", skip(self, ids), err)]
    pub async fn find_by_ids<I, S>(&self, ids: I) -> OrmResult<Vec<RawDocument>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        fetch_by_ids(
            self.client.api(),
            self.builder.predicates(),
            &ids,
            self.builder.options(),
        )
        .await
    }

    pub async fn find_by_id(&self, id: &str) -> OrmResult<Option<RawDocument>> {
        lookup(
            self.client.api(),
            self.builder.predicates(),
            Predicate::at("document.id", id),
            self.builder.options(),
        )
        .await
    }

    /// One page of documents with the current options.
    pub async fn get(&self) -> OrmResult<ResultPage> {
        Ok(self
            .client
            .api()
            .query(self.builder.predicates(), self.builder.options())
            .await?)
    }

    /// Every matching document, following pagination until the last page.
    #[instrument(name = "prismic.documents.all", skip(self), err)]
    pub async fn all(&self) -> OrmResult<Vec<RawDocument>> {
        fetch_all(
            self.client.api(),
            self.builder.predicates(),
            self.builder.options(),
        )
        .await
    }
}

impl<C> BuildQuery for DocumentQuery<C> {
    fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut QueryBuilder {
        &mut self.builder
    }
}

/// Options for a lookup that must return its matches on a single page.
fn lookup_options(options: &QueryOptions, page_size: usize) -> QueryOptions {
    QueryOptions {
        page: None,
        ..options.clone()
    }
    .page_size(page_size)
}

fn and(predicates: &[Predicate], predicate: Predicate) -> Vec<Predicate> {
    let mut all = predicates.to_vec();
    all.push(predicate);
    all
}

/// First document matching `predicates` and `predicate`.
async fn lookup(
    api: &dyn ContentApi,
    predicates: &[Predicate],
    predicate: Predicate,
    options: &QueryOptions,
) -> OrmResult<Option<RawDocument>> {
    let page = api
        .query(&and(predicates, predicate), &lookup_options(options, 1))
        .await?;
    Ok(page.results.into_iter().next())
}

async fn fetch_by_ids(
    api: &dyn ContentApi,
    predicates: &[Predicate],
    ids: &[String],
    options: &QueryOptions,
) -> OrmResult<Vec<RawDocument>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    if ids.len() > MAX_PAGE_SIZE {
        warn!(
            "bulk fetch of {} ids exceeds the page size limit of {}, later ids may be missing",
            ids.len(),
            MAX_PAGE_SIZE
        );
    }

    let predicates = and(predicates, Predicate::any("document.id", ids.to_vec()));
    let options = lookup_options(options, ids.len().min(MAX_PAGE_SIZE));
    let page = api
        .query(&predicates, &options)
        .await
        .tap_err(|e| tracing::error!("bulk fetch of {} documents failed: {}", ids.len(), e))?;

    Ok(page.results)
}

/// Sweep every page sequentially, in page order.
///
/// The page count follows the page size the API served on page 1, not the
/// requested one.
async fn fetch_all(
    api: &dyn ContentApi,
    predicates: &[Predicate],
    options: &QueryOptions,
) -> OrmResult<Vec<RawDocument>> {
    let start = Instant::now();

    let mut options = options.clone();
    if let Some(page_size) = options.page_size {
        options.page_size = Some(page_size.clamp(1, MAX_PAGE_SIZE));
    }

    let first = api.query(predicates, &options.with_page(1)).await?;
    let total = first.total_results_size;
    let served = first.results_size;
    let mut documents = first.results;

    if total > documents.len() && served > 0 {
        let last_page = total.div_ceil(served);
        debug!("fetching pages 2..={} of {} documents", last_page, total);

        for page in 2..=last_page {
            let next = api.query(predicates, &options.with_page(page)).await?;
            documents.extend(next.results);
        }
    }

    if documents.len() < total {
        warn!("page sweep returned {} of {} documents", documents.len(), total);
    }

    debug!(
        "retrieved {} of {} documents in {:?}",
        documents.len(),
        total,
        start.elapsed()
    );

    Ok(documents)
}
