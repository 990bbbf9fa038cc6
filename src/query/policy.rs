//! Fixed default options handed to every query client.

use crate::config::RuntimeEnvironment;
use std::time::Duration;

/// How long fetched data counts as fresh (5 minutes).
pub const STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// How long unused data stays cached (10 minutes).
pub const GC_TIME: Duration = Duration::from_secs(10 * 60);

/// Retries after a failed read.
pub const QUERY_RETRY: u32 = 3;

/// Retries after a failed write.
pub const MUTATION_RETRY: u32 = 1;

/// Cap on the delay between attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub stale_time: Duration,
    pub gc_time: Duration,
    pub retry: u32,
    pub refetch_on_window_focus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationDefaults {
    pub retry: u32,
}

/// Default options for reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub queries: QueryDefaults,
    pub mutations: MutationDefaults,
}

impl QueryPolicy {
    /// Application policy; window-focus refetching only in production.
    #[must_use]
    pub fn for_environment(env: RuntimeEnvironment) -> Self {
        Self {
            queries: QueryDefaults {
                stale_time: STALE_TIME,
                gc_time: GC_TIME,
                retry: QUERY_RETRY,
                refetch_on_window_focus: env.is_production(),
            },
            mutations: MutationDefaults {
                retry: MUTATION_RETRY,
            },
        }
    }
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::for_environment(RuntimeEnvironment::default())
    }
}

/// Delay before the next attempt after `failure_count` failures:
/// `min(1s * 2^failure_count, 30s)`.
#[must_use]
pub fn retry_delay(failure_count: u32) -> Duration {
    2u32.checked_pow(failure_count)
        .and_then(|factor| Duration::from_secs(1).checked_mul(factor))
        .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_values() {
        let policy = QueryPolicy::for_environment(RuntimeEnvironment::Development);

        assert_eq!(policy.queries.stale_time, Duration::from_secs(300));
        assert_eq!(policy.queries.gc_time, Duration::from_secs(600));
        assert_eq!(policy.queries.retry, 3);
        assert_eq!(policy.mutations.retry, 1);
        assert!(!policy.queries.refetch_on_window_focus);
    }

    #[test]
    fn test_focus_refetch_only_in_production() {
        assert!(
            QueryPolicy::for_environment(RuntimeEnvironment::Production)
                .queries
                .refetch_on_window_focus
        );
        assert!(
            !QueryPolicy::for_environment(RuntimeEnvironment::Test)
                .queries
                .refetch_on_window_focus
        );
    }

    #[test]
    fn test_retry_delay_backoff() {
        assert_eq!(retry_delay(0), Duration::from_secs(1));
        assert_eq!(retry_delay(1), Duration::from_secs(2));
        assert_eq!(retry_delay(4), Duration::from_secs(16));
        assert_eq!(retry_delay(5), Duration::from_secs(30));
        assert_eq!(retry_delay(64), Duration::from_secs(30));
    }
}
