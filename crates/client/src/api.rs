//! The remote API contract.

use crate::{ApiResult, Predicate, QueryOptions, RawDocument, ResultPage};

/// Largest `pageSize` the API accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// Operations a content repository client provides.
///
/// Only [`query`](ContentApi::query) is required; the lookups are expressed
/// through it by default, the same way the API's search endpoint serves them.
/// Implementations own transport concerns such as retries, caching and
/// timeouts.
#[async_trait::async_trait]
pub trait ContentApi: Send + Sync {
    /// Run a predicate query and return one page of results.
    async fn query(&self, predicates: &[Predicate], options: &QueryOptions)
        -> ApiResult<ResultPage>;

    /// Fetch one document by id. `Ok(None)` when nothing matches.
    async fn get_by_id(&self, id: &str, options: &QueryOptions) -> ApiResult<Option<RawDocument>> {
        let page = self
            .query(&[Predicate::at("document.id", id)], options)
            .await?;
        Ok(page.results.into_iter().next())
    }

    /// Fetch one document of a content type by its uid.
    async fn get_by_uid(
        &self,
        content_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> ApiResult<Option<RawDocument>> {
        let path = format!("my.{}.uid", content_type);
        let page = self.query(&[Predicate::at(path, uid)], options).await?;
        Ok(page.results.into_iter().next())
    }

    /// Fetch many documents by id in one call.
    async fn get_by_ids(&self, ids: &[String], options: &QueryOptions) -> ApiResult<ResultPage> {
        self.query(&[Predicate::any("document.id", ids.to_vec())], options)
            .await
    }

    /// Fetch the document of a singleton content type.
    async fn get_single(
        &self,
        content_type: &str,
        options: &QueryOptions,
    ) -> ApiResult<Option<RawDocument>> {
        let page = self
            .query(&[Predicate::at("document.type", content_type)], options)
            .await?;
        Ok(page.results.into_iter().next())
    }
}

#[async_trait::async_trait]
impl<T: ContentApi + ?Sized> ContentApi for &T {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> ApiResult<ResultPage> {
        (**self).query(predicates, options).await
    }

    async fn get_by_id(&self, id: &str, options: &QueryOptions) -> ApiResult<Option<RawDocument>> {
        (**self).get_by_id(id, options).await
    }

    async fn get_by_uid(
        &self,
        content_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> ApiResult<Option<RawDocument>> {
        (**self).get_by_uid(content_type, uid, options).await
    }

    async fn get_by_ids(&self, ids: &[String], options: &QueryOptions) -> ApiResult<ResultPage> {
        (**self).get_by_ids(ids, options).await
    }

    async fn get_single(
        &self,
        content_type: &str,
        options: &QueryOptions,
    ) -> ApiResult<Option<RawDocument>> {
        (**self).get_single(content_type, options).await
    }
}

#[async_trait::async_trait]
impl<T: ContentApi + ?Sized> ContentApi for std::sync::Arc<T> {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> ApiResult<ResultPage> {
        (**self).query(predicates, options).await
    }

    async fn get_by_id(&self, id: &str, options: &QueryOptions) -> ApiResult<Option<RawDocument>> {
        (**self).get_by_id(id, options).await
    }

    async fn get_by_uid(
        &self,
        content_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> ApiResult<Option<RawDocument>> {
        (**self).get_by_uid(content_type, uid, options).await
    }

    async fn get_by_ids(&self, ids: &[String], options: &QueryOptions) -> ApiResult<ResultPage> {
        (**self).get_by_ids(ids, options).await
    }

    async fn get_single(
        &self,
        content_type: &str,
        options: &QueryOptions,
    ) -> ApiResult<Option<RawDocument>> {
        (**self).get_single(content_type, options).await
    }
}
