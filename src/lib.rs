//! Frontend application glue.
//!
//! Four independent units, mounted side by side by an [`AppSession`]:
//!
//! - [`theme`]: static visual configuration and the pre-hydration color scheme marker
//! - [`query`]: one data-fetching/caching client per session
//! - [`api`]: REST wrapper for the backend service
//! - [`store`]: UI flags with the sidebar state persisted
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use frontend_kit::AppSession;
//! use frontend_kit::config::AppConfig;
//! use frontend_kit::store::MemoryStorage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = AppSession::new(&AppConfig::default(), Arc::new(MemoryStorage::new()))?;
//!
//! session.ui.toggle_sidebar();
//! assert!(!session.ui.sidebar_open());
//! assert_eq!(session.api.base_url(), "http://localhost:3001/api");
//! assert!(!session.query_client().policy().queries.refetch_on_window_focus);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod query;
pub mod store;
pub mod telemetry;
pub mod theme;

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::query::{QueryClient, QueryPolicy, QueryProvider};
use crate::store::{StateStorage, UiStore};
use crate::theme::ThemeProvider;

/// Everything one application session mounts.
///
/// Build one per session; nothing here is shared between sessions.
#[derive(Debug)]
pub struct AppSession {
    /// Theme and color scheme marker.
    pub theme: ThemeProvider,
    /// Owner of the session's query client.
    pub query: QueryProvider,
    /// REST wrapper bound to the configured base URL.
    pub api: ApiClient,
    /// UI flags.
    pub ui: UiStore,
}

impl AppSession {
    pub fn new(config: &AppConfig, storage: Arc<dyn StateStorage>) -> api::Result<Self> {
        let session = Self {
            theme: ThemeProvider::new(),
            query: QueryProvider::new(QueryPolicy::for_environment(config.environment)),
            api: ApiClient::from_config(&config.api)?,
            ui: UiStore::new(storage),
        };

        info!(
            name: "session.created",
            environment = %config.environment,
            api_base_url = %config.api.base_url,
            "Application session created"
        );

        Ok(session)
    }

    /// The session's query client, created on first use.
    pub fn query_client(&self) -> &QueryClient {
        self.query.mount()
    }
}
