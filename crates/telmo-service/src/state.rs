//! Application state.

use std::sync::Arc;

use telmo_ledger::Ledger;
use telmo_store::{CatalogStore, TransactionStore};

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger, over the transaction store and catalog.
    pub ledger: Arc<Ledger>,

    /// Direct store handle for the provisioning endpoints.
    pub store: Arc<dyn TransactionStore>,

    /// Direct catalog handle for the seeding endpoint.
    pub catalog: Arc<dyn CatalogStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn TransactionStore>,
        catalog: Arc<dyn CatalogStore>,
        config: ServiceConfig,
    ) -> Self {
        if config.service_api_key.is_none() {
            tracing::warn!("SERVICE_API_KEY not set - provisioning endpoints are disabled");
        }

        Self {
            ledger: Arc::new(Ledger::new(store.clone(), catalog.clone())),
            store,
            catalog,
            config,
        }
    }
}
