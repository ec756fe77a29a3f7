//! URL building utilities for content API endpoints

use url::Url;

use crate::{render_predicates, Predicate, QueryOptions};

/// Centralized URL builder for content API endpoints.
/// Keeps path and query construction in one place.
#[derive(Debug)]
pub struct UrlBuilder<'a> {
    endpoint: &'a Url,
    parts: Vec<String>,
    query_params: Vec<(String, String)>,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(endpoint: &'a Url) -> Self {
        Self {
            endpoint,
            parts: Vec::new(),
            query_params: Vec::new(),
        }
    }

    /// Add a path segment (documents, search, ...)
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.parts.push(endpoint.to_string());
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Pin the content ref the search runs against
    pub fn content_ref(self, content_ref: &str) -> Self {
        self.query("ref", content_ref)
    }

    /// Add the `q` parameter; left out when there are no predicates
    pub fn predicates(mut self, predicates: &[Predicate]) -> Self {
        if !predicates.is_empty() {
            self.query_params
                .push(("q".to_string(), render_predicates(predicates)));
        }
        self
    }

    /// Add every option that is set
    pub fn options(mut self, options: &QueryOptions) -> Self {
        self.query_params.extend(
            options
                .to_query_pairs()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value)),
        );
        self
    }

    /// Add the access token for private repositories
    pub fn access_token(self, token: Option<&str>) -> Self {
        match token {
            Some(token) => self.query("access_token", token),
            None => self,
        }
    }

    /// Build the final URL; query values are percent encoded here
    pub fn build(self) -> Url {
        let mut url = self.endpoint.clone();

        if !self.parts.is_empty() {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty();
                for part in &self.parts {
                    segments.push(part);
                }
            }
        }

        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn endpoint() -> Url {
        Url::parse("https://repo.cdn.prismic.io/api/v2").unwrap()
    }

    #[test]
    fn test_search_url() {
        let endpoint = endpoint();
        let url = UrlBuilder::new(&endpoint)
            .endpoint("documents")
            .endpoint("search")
            .content_ref("XyZ")
            .predicates(&[Predicate::at("document.type", "article")])
            .options(&QueryOptions::new().page_size(10).page(2))
            .build();

        assert_eq!(url.path(), "/api/v2/documents/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("ref".to_string(), "XyZ".to_string()),
                ("q".to_string(), r#"[[at(document.type, "article")]]"#.to_string()),
                ("pageSize".to_string(), "10".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_trailing_slash_endpoint() {
        let endpoint = Url::parse("https://repo.cdn.prismic.io/api/v2/").unwrap();
        let url = UrlBuilder::new(&endpoint)
            .endpoint("documents")
            .endpoint("search")
            .build();
        assert_eq!(url.path(), "/api/v2/documents/search");
    }

    #[test]
    fn test_access_token_only_when_set() {
        let endpoint = endpoint();
        let without = UrlBuilder::new(&endpoint).access_token(None).build();
        assert_eq!(without.query(), None);

        let with = UrlBuilder::new(&endpoint).access_token(Some("secret")).build();
        assert_eq!(with.query(), Some("access_token=secret"));
    }
}
