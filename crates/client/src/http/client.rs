//! Core HTTP client struct and constructors

use std::{sync::Arc, time::Instant};

use {
    crate::{
        ApiError, ApiResult, ClientConfig, ContentApi, Predicate, QueryOptions, ResultPage,
    },
    ::tracing::{debug, instrument},
    reqwest::Client,
    tokio::sync::OnceCell,
    url::Url,
};

use super::{response::ApiInfo, url_builder::UrlBuilder};

/// HTTP client for a content repository's REST API.
///
/// The master ref is looked up on first use and kept for the lifetime of the
/// client (and its clones). Build a new client, or pin a ref in the
/// configuration, to read a newer release.
#[derive(Clone, Debug)]
pub struct PrismicHttpClient {
    pub endpoint: Url,
    pub(crate) http: Client,
    pub(crate) access_token: Option<String>,
    pinned_ref: Option<String>,
    master_ref: Arc<OnceCell<String>>,
}

impl PrismicHttpClient {
    /// Creates a client from explicit configuration.
    ///
    /// # Example
    /// ```ignore
    /// let client = PrismicHttpClient::new(ClientConfig::new(
    ///     Url::parse("https://my-repo.cdn.prismic.io/api/v2")?,
    /// ))?;
    /// ```
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        Ok(Self {
            endpoint: config.endpoint,
            http: Client::builder().timeout(config.timeout).build()?,
            access_token: config.access_token,
            pinned_ref: config.pinned_ref,
            master_ref: Arc::new(OnceCell::new()),
        })
    }

    /// Creates a client from `PRISMIC_*` environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Centralized URL builder for API endpoints.
    pub(crate) fn build_url(&self) -> UrlBuilder<'_> {
        UrlBuilder::new(&self.endpoint)
    }

    /// The ref every search runs against.
    pub async fn content_ref(&self) -> ApiResult<String> {
        if let Some(pinned) = &self.pinned_ref {
            return Ok(pinned.clone());
        }

        self.master_ref
            .get_or_try_init(|| self.fetch_master_ref())
            .await
            .cloned()
    }

    #[instrument(name = "prismic.api.master_ref", skip(self), err)]
    async fn fetch_master_ref(&self) -> ApiResult<String> {
        let uri = self
            .build_url()
            .access_token(self.access_token.as_deref())
            .build();

        debug!("retrieving api entry point {}", self.endpoint);

        let res = self.http.get(uri).send().await?;
        let info: ApiInfo = self.parse_response(res).await?;

        let master = info.master_ref().ok_or(ApiError::NoMasterRef)?;
        debug!("using master ref {} ({:?})", master.content_ref, master.label);

        Ok(master.content_ref.clone())
    }
}

#[async_trait::async_trait]
impl ContentApi for PrismicHttpClient {
    #[instrument(
        name = "prismic.documents.search",
        skip(self, predicates, options),
        fields(
            predicates = predicates.len(),
            page = ?options.page,
            page_size = ?options.page_size
        ),
        err
    )]
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> ApiResult<ResultPage> {
        let content_ref = self.content_ref().await?;

        let uri = self
            .build_url()
            .endpoint("documents")
            .endpoint("search")
            .content_ref(&content_ref)
            .predicates(predicates)
            .options(options)
            .access_token(self.access_token.as_deref())
            .build();

        debug!("searching documents at {}...", self.endpoint);

        let start = Instant::now();

        let res = self.http.get(uri).send().await?;

        debug!("retrieved search results with status code: {}", res.status());

        let page: ResultPage = self.parse_response(res).await?;

        debug!(
            "retrieved {} of {} documents in {:?}",
            page.results_size,
            page.total_results_size,
            start.elapsed()
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(pinned_ref: Option<&str>) -> PrismicHttpClient {
        let mut config =
            ClientConfig::new(Url::parse("https://repo.cdn.prismic.io/api/v2").unwrap());
        config.pinned_ref = pinned_ref.map(str::to_string);
        PrismicHttpClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_pinned_ref_skips_entry_point() {
        let client = client(Some("Pinned1"));
        assert_eq!(client.content_ref().await.unwrap(), "Pinned1");
    }

    #[test]
    fn test_build_url_starts_at_endpoint() {
        let client = client(None);
        let url = client.build_url().endpoint("documents").build();
        assert_eq!(url.as_str(), "https://repo.cdn.prismic.io/api/v2/documents");
    }
}
