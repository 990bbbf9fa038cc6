//! Query client supplier.
//!
//! - [`QueryPolicy`]: fixed freshness, eviction and retry options
//! - [`QueryClient`]: the session's data-fetching cache
//! - [`QueryProvider`]: builds the client on first mount and keeps it
//!
//! # Example
//!
//! ```rust
//! use frontend_kit::config::RuntimeEnvironment;
//! use frontend_kit::query::{QueryPolicy, QueryProvider};
//!
//! let provider = QueryProvider::new(QueryPolicy::for_environment(RuntimeEnvironment::Production));
//! let first = provider.mount().clone();
//! let again = provider.mount();
//! assert!(first.same_client(again));
//! assert!(first.policy().queries.refetch_on_window_focus);
//! ```

mod client;
mod policy;

pub use client::{QueryClient, QueryKey};
pub use policy::{
    GC_TIME, MUTATION_RETRY, MutationDefaults, QUERY_RETRY, QueryDefaults, QueryPolicy,
    STALE_TIME, retry_delay,
};

use std::sync::OnceLock;
use tracing::info;

/// Owns the query client of one session.
///
/// The client is constructed on the first [`mount`](Self::mount) and every
/// later mount returns that same instance.
#[derive(Debug)]
pub struct QueryProvider {
    policy: QueryPolicy,
    client: OnceLock<QueryClient>,
}

impl QueryProvider {
    #[must_use]
    pub fn new(policy: QueryPolicy) -> Self {
        Self {
            policy,
            client: OnceLock::new(),
        }
    }

    pub fn mount(&self) -> &QueryClient {
        self.client.get_or_init(|| {
            info!(
                name: "query.client.created",
                stale_time = ?self.policy.queries.stale_time,
                gc_time = ?self.policy.queries.gc_time,
                retry = self.policy.queries.retry,
                mutation_retry = self.policy.mutations.retry,
                refetch_on_window_focus = self.policy.queries.refetch_on_window_focus,
                "Query client created"
            );
            QueryClient::new(self.policy)
        })
    }

    pub fn is_mounted(&self) -> bool {
        self.client.get().is_some()
    }

    #[must_use]
    pub fn policy(&self) -> &QueryPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeEnvironment;

    #[test]
    fn test_client_built_once() {
        let provider = QueryProvider::new(QueryPolicy::default());
        assert!(!provider.is_mounted());

        let a = provider.mount().clone();
        assert!(provider.is_mounted());
        for _ in 0..5 {
            assert!(provider.mount().same_client(&a));
        }
    }

    #[test]
    fn test_providers_do_not_share_clients() {
        let policy = QueryPolicy::for_environment(RuntimeEnvironment::Test);
        let first = QueryProvider::new(policy);
        let second = QueryProvider::new(policy);

        first.mount().set_query_data("me", "alice".to_string());

        assert!(!first.mount().same_client(second.mount()));
        assert!(second.mount().get_query_data::<String>("me").is_none());
    }
}
