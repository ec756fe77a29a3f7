//! Client configuration.

use std::{env, time::Duration};

use derive_builder::Builder;
use url::Url;

use crate::{ApiError, ApiResult};

/// Connection settings for a content repository.
///
/// # Example
/// ```ignore
/// let config = ClientConfigBuilder::default()
///     .endpoint(Url::parse("https://my-repo.cdn.prismic.io/api/v2")?)
///     .access_token(Some("secret".to_string()))
///     .build()?;
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ClientConfig {
    /// API entry point, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: Url,
    /// Access token for private repositories
    #[builder(default)]
    pub access_token: Option<String>,
    /// Per request timeout
    #[builder(default = "Duration::from_secs(30)")]
    pub timeout: Duration,
    /// Query against this ref instead of the repository's master ref
    #[builder(default)]
    pub pinned_ref: Option<String>,
}

impl ClientConfig {
    pub const ENDPOINT_VAR: &'static str = "PRISMIC_API_ENDPOINT";
    pub const ACCESS_TOKEN_VAR: &'static str = "PRISMIC_ACCESS_TOKEN";
    pub const TIMEOUT_VAR: &'static str = "PRISMIC_TIMEOUT_SECS";
    pub const REF_VAR: &'static str = "PRISMIC_REF";

    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            access_token: None,
            timeout: Duration::from_secs(30),
            pinned_ref: None,
        }
    }

    /// Read the configuration from `PRISMIC_*` environment variables.
    ///
    /// Only the endpoint is required.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let endpoint = lookup(Self::ENDPOINT_VAR)
            .ok_or_else(|| ApiError::Config(format!("{} is not set", Self::ENDPOINT_VAR)))?;
        let endpoint = Url::parse(&endpoint)?;

        let timeout = match lookup(Self::TIMEOUT_VAR) {
            Some(secs) => Duration::from_secs(secs.parse().map_err(|_| {
                ApiError::Config(format!("{} must be a number of seconds", Self::TIMEOUT_VAR))
            })?),
            None => Duration::from_secs(30),
        };

        Ok(Self {
            endpoint,
            access_token: lookup(Self::ACCESS_TOKEN_VAR).filter(|token| !token.is_empty()),
            timeout,
            pinned_ref: lookup(Self::REF_VAR).filter(|r| !r.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(
        vars: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_from_lookup_defaults() {
        let vars = HashMap::from([("PRISMIC_API_ENDPOINT", "https://repo.cdn.prismic.io/api/v2")]);
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.endpoint.as_str(), "https://repo.cdn.prismic.io/api/v2");
        assert_eq!(config.access_token, None);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.pinned_ref, None);
    }

    #[test]
    fn test_from_lookup_all_vars() {
        let vars = HashMap::from([
            ("PRISMIC_API_ENDPOINT", "https://repo.cdn.prismic.io/api/v2"),
            ("PRISMIC_ACCESS_TOKEN", "secret"),
            ("PRISMIC_TIMEOUT_SECS", "5"),
            ("PRISMIC_REF", "XyZref"),
        ]);
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.access_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.pinned_ref.as_deref(), Some("XyZref"));
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let vars: HashMap<&'static str, &'static str> = HashMap::new();
        let err = ClientConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        let vars = HashMap::from([
            ("PRISMIC_API_ENDPOINT", "https://repo.cdn.prismic.io/api/v2"),
            ("PRISMIC_TIMEOUT_SECS", "soon"),
        ]);
        let err = ClientConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfigBuilder::default()
            .endpoint(Url::parse("https://repo.cdn.prismic.io/api/v2").unwrap())
            .build()
            .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.access_token.is_none());
    }
}
