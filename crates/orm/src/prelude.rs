//! Prelude for convenient ORM imports.
//!
//! # Example
//! ```ignore
//! use prismic_orm::prelude::*;
//!
//! // Initialize global client
//! OrmClient::init(PrismicHttpClient::from_env()?)?;
//!
//! let page = Article::query().paginate(PaginateOpts::new()).await?;
//! ```

// ORM types
pub use crate::{
    load_relation, AnyModel, BuildQuery, ClientProvider, DocumentQuery, GlobalClient, Model,
    ModelDocument, ModelExt, ModelQuery, ModelRegistry, OrmClient, OrmError, OrmResult,
    PaginateOpts, Paginated, QueryBuilder, RelationDescriptor, RelationResolver, RelationTarget,
};

// Client types
pub use crate::{ContentApi, PrismicHttpClient, QueryOptions, RawDocument, SortDirection};
