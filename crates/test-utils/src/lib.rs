// crates/test-utils/src/lib.rs

//! Shared helpers for `flowrun` integration tests.

pub mod builders;
pub mod fake_backend;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use flowrun::logging::LOG_ENV;
use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for tests that spawn real processes.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// The filter comes from `FLOWRUN_LOG` (same variable as the binary) and
/// defaults to `flowrun=info`, so only engine logs show up in failing tests.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("warn,flowrun=info"));

        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `fut`, panicking if it takes longer than `limit`.
pub async fn with_timeout<F, T>(limit: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(value) => value,
        Err(_) => panic!("test future did not finish within {limit:?}"),
    }
}
