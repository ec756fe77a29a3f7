//! Prismic content API client.
//!
//! Holds the wire vocabulary understood by the remote repository
//! ([`Predicate`], [`QueryOptions`]), the raw response types
//! ([`RawDocument`], [`ResultPage`], [`RelationReference`]) and the
//! [`ContentApi`] contract the ORM layer is written against.
//!
//! # Example
//! ```ignore
//! use prismic_client::*;
//!
//! let client = PrismicHttpClient::from_env()?;
//! let page = client
//!     .query(&[Predicate::at("document.type", "article")], &QueryOptions::default())
//!     .await?;
//! println!("{} articles", page.total_results_size);
//! ```

mod api;
mod config;
mod document;
pub mod err;
mod http;
mod options;
mod predicate;

/// In-memory content repository for tests.
///
/// Enable with `#[cfg(test)]` or when the `testing` feature is enabled.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{ContentApi, MAX_PAGE_SIZE};
pub use config::{ClientConfig, ClientConfigBuilder, ClientConfigBuilderError};
pub use document::{
    AlternateLanguage, RawDocument, RelationReference, ResultPage, DOCUMENT_LINK_TYPE,
    PUBLICATION_DATE_FORMAT,
};
pub use err::{ApiError, ApiResult};
pub use http::PrismicHttpClient;
pub use options::{QueryOptions, SortDirection};
pub use predicate::{render_predicates, Operator, Predicate};
