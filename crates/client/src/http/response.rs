//! Response parsing utilities for the HTTP client

use {
    crate::{ApiError, ApiResult},
    ::tracing::{instrument, trace},
    reqwest::Response,
    serde::{de::DeserializeOwned, Deserialize},
    tap::TapFallible,
};

/// One content ref advertised by the API entry point.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiRef {
    #[serde(rename = "ref")]
    pub content_ref: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// The parts of the API entry point response the client needs.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&ApiRef> {
        self.refs.iter().find(|r| r.is_master_ref)
    }
}

/// Response parsing methods for the HTTP client
impl super::client::PrismicHttpClient {
    #[instrument(
        name = "prismic.response.parse",
        skip(self, res),
        fields(
            response_type = std::any::type_name::<T>()
        ),
        err
    )]
    pub(crate) async fn parse_response<T: DeserializeOwned>(&self, res: Response) -> ApiResult<T> {
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }

        trace!("[PrismicHttpClient] response: {}", &body);

        serde_json::from_str::<T>(&body)
            .map_err(ApiError::from)
            .tap_err(|e| {
                tracing::error!("failed to parse response text as JSON ({:?}): {}", e, body);
            })
    }
}
