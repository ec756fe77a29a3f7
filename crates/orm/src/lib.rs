//! Prismic ORM Layer
//!
//! Provides an ActiveRecord-like API for querying Prismic content repositories,
//! with batch loading of related documents.
//!
//! # Example
//! ```ignore
//! use prismic_orm::prelude::*;
//!
//! OrmClient::init(PrismicHttpClient::from_env()?)?;
//!
//! let articles: Vec<Article> = Article::query()
//!     .where_tag("featured")
//!     .with(["author"])?
//!     .all()
//!     .await?;
//!
//! let author = articles[0].document().related::<Author>("/author");
//! ```

mod builder;
mod client;
mod error;
mod model;
mod query;
mod relations;
mod resolver;
mod result;

pub mod prelude;

/// In-memory content API for tests.
#[cfg(feature = "testing")]
pub use prismic_client::testing;

pub use builder::{BuildQuery, QueryBuilder, RESERVED_ATTRIBUTES};
pub use client::{ClientAlreadyInitializedError, ClientProvider, GlobalClient, OrmClient};
pub use error::{OrmError, OrmResult};
pub use model::{AnyModel, Model, ModelDocument, ModelExt};
pub use query::{DocumentQuery, ModelQuery};
pub use relations::{ModelFactory, ModelRegistry, RelationDescriptor, RelationShape, RelationTarget};
pub use resolver::{load_relation, RelationResolver, ResolveOutcome};
pub use result::{PaginateOpts, Paginated};

// Re-export commonly used types from the client
pub use prismic_client::{
    ApiError, ContentApi, Predicate, PrismicHttpClient, QueryOptions, RawDocument,
    RelationReference, ResultPage, SortDirection,
};
