//! Global client singleton for ORM operations.
//!
//! Provides a set-once global content API that can be accessed from anywhere in the application.

use std::sync::{Arc, OnceLock};

use prismic_client::ContentApi;

/// Global ORM client singleton
static GLOBAL_CLIENT: OnceLock<Arc<dyn ContentApi>> = OnceLock::new();

/// Error returned when attempting to initialize the global client twice
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ClientAlreadyInitializedError {
    pub message: String,
}

/// ORM client management.
///
/// Provides methods to initialize and access a global content API singleton.
///
/// # Example
/// ```ignore
/// use prismic_orm::OrmClient;
/// use prismic_client::PrismicHttpClient;
///
/// // Initialize once at application startup
/// OrmClient::init(PrismicHttpClient::from_env()?)?;
///
/// // Access from anywhere
/// let api = OrmClient::get();
/// ```
pub struct OrmClient;

impl OrmClient {
    /// Initialize the global ORM client.
    ///
    /// Returns `Ok(())` on first call, `Err(ClientAlreadyInitializedError)` on subsequent calls.
    /// If multiple threads race to initialize, exactly one succeeds.
    pub fn init(client: impl ContentApi + 'static) -> Result<(), ClientAlreadyInitializedError> {
        Self::init_shared(Arc::new(client))
    }

    /// Initialize with an already shared client.
    pub fn init_shared(client: Arc<dyn ContentApi>) -> Result<(), ClientAlreadyInitializedError> {
        GLOBAL_CLIENT
            .set(client)
            .map_err(|_| ClientAlreadyInitializedError {
                message: "ORM client has already been initialized. \
                     OrmClient::init() can only be called once per process."
                    .to_string(),
            })
    }

    /// Get a reference to the global client.
    ///
    /// # Panics
    /// Panics if `OrmClient::init()` has not been called.
    pub fn get() -> &'static dyn ContentApi {
        GLOBAL_CLIENT
            .get()
            .expect("ORM client not initialized. Call OrmClient::init() before using ORM features.")
            .as_ref()
    }

    /// Try to get a reference to the global client.
    ///
    /// Returns `None` if the client has not been initialized.
    pub fn try_get() -> Option<&'static dyn ContentApi> {
        GLOBAL_CLIENT.get().map(|client| client.as_ref())
    }

    pub fn is_initialized() -> bool {
        GLOBAL_CLIENT.get().is_some()
    }
}

/// Trait for obtaining a content API reference.
///
/// This allows queries to run against either the global client or an explicit one,
/// useful for testing or multi-tenant scenarios.
pub trait ClientProvider {
    fn api(&self) -> &dyn ContentApi;
}

/// Uses the global client singleton.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalClient;

impl ClientProvider for GlobalClient {
    fn api(&self) -> &dyn ContentApi {
        OrmClient::get()
    }
}

impl<T: ContentApi> ClientProvider for T {
    fn api(&self) -> &dyn ContentApi {
        self
    }
}
