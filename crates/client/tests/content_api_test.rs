//! The default `ContentApi` lookups, observed through an implementation that
//! only provides `query`.

use std::sync::Mutex;

use pretty_assertions::assert_eq;
use prismic_client::{
    render_predicates, ApiResult, ClientConfigBuilder, ContentApi, Predicate, QueryOptions,
    RawDocument, ResultPage,
};
use url::Url;

#[derive(Default)]
struct QueryOnly {
    seen: Mutex<Vec<(String, QueryOptions)>>,
}

impl QueryOnly {
    fn seen(&self) -> Vec<(String, QueryOptions)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ContentApi for QueryOnly {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> ApiResult<ResultPage> {
        self.seen
            .lock()
            .unwrap()
            .push((render_predicates(predicates), options.clone()));
        Ok(ResultPage::new(vec![RawDocument::new("X1", "article")], 1))
    }
}

#[tokio::test]
async fn test_lookups_go_through_query() {
    let api = QueryOnly::default();
    let opts = QueryOptions::new().lang("en-us");

    let by_id = api.get_by_id("X1", &opts).await.unwrap();
    assert_eq!(by_id.map(|d| d.id), Some("X1".to_string()));
    api.get_by_uid("article", "hello", &opts).await.unwrap();
    api.get_by_ids(&["X1".to_string(), "X2".to_string()], &opts)
        .await
        .unwrap();
    api.get_single("homepage", &opts).await.unwrap();

    let rendered: Vec<String> = api.seen().into_iter().map(|(q, _)| q).collect();
    assert_eq!(
        rendered,
        vec![
            r#"[[at(document.id, "X1")]]"#.to_string(),
            r#"[[at(my.article.uid, "hello")]]"#.to_string(),
            r#"[[any(document.id, ["X1","X2"])]]"#.to_string(),
            r#"[[at(document.type, "homepage")]]"#.to_string(),
        ]
    );
    assert!(api
        .seen()
        .iter()
        .all(|(_, options)| options.lang.as_deref() == Some("en-us")));
}

#[tokio::test]
async fn test_shared_api_forwards() {
    let api = std::sync::Arc::new(QueryOnly::default());
    let shared: std::sync::Arc<dyn ContentApi> = api.clone();

    shared
        .get_single("homepage", &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(api.seen().len(), 1);
}

#[test]
fn test_config_builder_defaults() {
    let config = ClientConfigBuilder::default()
        .endpoint(Url::parse("https://repo.cdn.prismic.io/api/v2").unwrap())
        .build()
        .unwrap();

    assert_eq!(config.timeout, std::time::Duration::from_secs(30));
    assert_eq!(config.access_token, None);
    assert_eq!(config.pinned_ref, None);
}

#[test]
fn test_config_builder_requires_endpoint() {
    assert!(ClientConfigBuilder::default().build().is_err());
}
