//! Relation resolution for ORM queries.
//!
//! Every slot of a relation is classified on its own:
//!
//! 1. **Unresolvable** - not an object, broken, without id, or not a document
//!    link. Left untouched.
//! 2. **Resolved** - the slot already holds a model. Nothing to do, so
//!    resolving twice keeps the same instance.
//! 3. **Eagerly loaded** - the API inlined the target (`fetchLinks`). The
//!    model is built from the reference without any API call.
//! 4. **Deferred** - the id is collected for the batch.
//!
//! After all models passed to one [`RelationResolver::resolve`] call are
//! classified, the de-duplicated deferred ids are fetched with a single bulk
//! call and each document is mapped back onto the slots that asked for it.
//! No N+1.

use std::collections::HashMap;

use itertools::Itertools;
use prismic_client::{ContentApi, QueryOptions, RawDocument, RelationReference, MAX_PAGE_SIZE};
use tap::TapFallible;
use tracing::{debug, instrument, trace, warn};

use crate::{
    relations::ModelFactory, ClientProvider, Model, OrmError, OrmResult, RelationDescriptor,
};

/// What one resolve pass did, slot by slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOutcome {
    /// Slots built from inlined reference data.
    pub eager: usize,
    /// Slots filled from the bulk fetch.
    pub fetched: usize,
    /// Deferred slots whose id the bulk fetch did not return.
    pub missing: usize,
    /// Slots whose reference type has no registered model.
    pub skipped: usize,
    pub already_resolved: usize,
    pub unresolvable: usize,
    /// Number of bulk fetches issued, zero or one.
    pub bulk_fetches: usize,
}

impl ResolveOutcome {
    fn merge(&mut self, other: ResolveOutcome) {
        self.eager += other.eager;
        self.fetched += other.fetched;
        self.missing += other.missing;
        self.skipped += other.skipped;
        self.already_resolved += other.already_resolved;
        self.unresolvable += other.unresolvable;
        self.bulk_fetches += other.bulk_fetches;
    }
}

/// A slot waiting for the bulk fetch.
struct Deferred {
    model: usize,
    slot: String,
    id: String,
    factory: ModelFactory,
}

/// Resolves declared relations of loaded models against a content API.
pub struct RelationResolver<'a> {
    api: &'a dyn ContentApi,
}

impl<'a> RelationResolver<'a> {
    pub fn new(api: &'a dyn ContentApi) -> Self {
        Self { api }
    }

    /// Resolve one relation across a whole result set with at most one API call.
    #[instrument(
        name = "prismic.relations.resolve",
        skip(self, models, descriptor),
        fields(
            relation = %descriptor.name,
            models = models.len()
        ),
        err
    )]
    pub async fn resolve<M: Model>(
        &self,
        models: &mut [M],
        descriptor: &RelationDescriptor,
    ) -> OrmResult<ResolveOutcome> {
        let mut outcome = ResolveOutcome::default();
        let mut eager: Vec<(usize, String, RawDocument, ModelFactory)> = Vec::new();
        let mut deferred: Vec<Deferred> = Vec::new();

        for (index, model) in models.iter().enumerate() {
            let document = model.document();
            let Some(raw) = document.raw() else {
                continue;
            };

            for slot in descriptor.slots(&raw.data) {
                if document.is_resolved(&slot) {
                    outcome.already_resolved += 1;
                    continue;
                }

                let reference = document
                    .value_at(&slot)
                    .and_then(RelationReference::from_value)
                    .filter(RelationReference::is_resolvable);
                let Some(reference) = reference else {
                    trace!("slot {} of {} is not resolvable", slot, raw.id);
                    outcome.unresolvable += 1;
                    continue;
                };

                let Some(factory) = descriptor
                    .target
                    .factory_for(reference.content_type.as_deref())
                else {
                    warn!(
                        "no model registered for type {:?} at slot {} of {}, leaving it unresolved",
                        reference.content_type, slot, raw.id
                    );
                    outcome.skipped += 1;
                    continue;
                };

                match (reference.to_document(), reference.id) {
                    (Some(inlined), _) => eager.push((index, slot, inlined, factory)),
                    (None, Some(id)) => deferred.push(Deferred {
                        model: index,
                        slot,
                        id,
                        factory,
                    }),
                    (None, None) => outcome.unresolvable += 1,
                }
            }
        }

        for (index, slot, inlined, factory) in eager {
            models[index].document_mut().set_resolved(slot, factory(inlined));
            outcome.eager += 1;
        }

        if deferred.is_empty() {
            return Ok(outcome);
        }

        let fetched = self.fetch_unique(&deferred).await?;
        outcome.bulk_fetches = 1;

        for Deferred {
            model,
            slot,
            id,
            factory,
        } in deferred
        {
            match fetched.get(id.as_str()) {
                Some(document) => {
                    models[model]
                        .document_mut()
                        .set_resolved(slot, factory(document.clone()));
                    outcome.fetched += 1;
                }
                None => {
                    debug!("document {} not returned, slot {} stays a reference", id, slot);
                    outcome.missing += 1;
                }
            }
        }

        debug!("resolved relation {}: {:?}", descriptor.name, outcome);

        Ok(outcome)
    }

    /// Resolve one relation of a single model.
    pub async fn resolve_one<M: Model>(
        &self,
        model: &mut M,
        descriptor: &RelationDescriptor,
    ) -> OrmResult<ResolveOutcome> {
        self.resolve(std::slice::from_mut(model), descriptor).await
    }

    /// Resolve several relations, one batch per relation.
    pub async fn resolve_all<M: Model>(
        &self,
        models: &mut [M],
        descriptors: &[RelationDescriptor],
    ) -> OrmResult<ResolveOutcome> {
        let mut outcome = ResolveOutcome::default();
        for descriptor in descriptors {
            outcome.merge(self.resolve(models, descriptor).await?);
        }
        Ok(outcome)
    }

    /// One bulk call for every distinct deferred id; first document per id wins.
    async fn fetch_unique(&self, deferred: &[Deferred]) -> OrmResult<HashMap<String, RawDocument>> {
        let ids = deferred.iter().map(|d| d.id.clone()).unique().collect_vec();

        if ids.len() > MAX_PAGE_SIZE {
            warn!(
                "bulk fetch of {} ids exceeds the page size limit of {}, later ids may be missing",
                ids.len(),
                MAX_PAGE_SIZE
            );
        }

        let options = QueryOptions::new().page_size(ids.len().min(MAX_PAGE_SIZE));

        debug!("bulk fetching {} related documents", ids.len());

        let page = self
            .api
            .get_by_ids(&ids, &options)
            .await
            .tap_err(|e| tracing::error!("bulk fetch of related documents failed: {}", e))?;

        let mut by_id = HashMap::with_capacity(page.results.len());
        for document in page.results {
            by_id.entry(document.id.clone()).or_insert(document);
        }
        Ok(by_id)
    }
}

/// Resolve a declared relation of one model on first access.
///
/// Slots filled by an earlier call are kept, so repeated calls make no API
/// requests once everything is resolved.
///
/// # Example
/// ```ignore
/// load_relation(&mut article, "author", &GlobalClient).await?;
/// let author = article.document().related::<Author>("/author");
/// ```
pub async fn load_relation<M, C>(
    model: &mut M,
    name: &str,
    provider: &C,
) -> OrmResult<ResolveOutcome>
where
    M: Model,
    C: ClientProvider + ?Sized,
{
    let descriptor = M::relation(name).ok_or_else(|| {
        OrmError::invalid(format!("{} declares no relation named `{}`", M::TYPE, name))
    })?;

    RelationResolver::new(provider.api())
        .resolve_one(model, &descriptor)
        .await
}
