//! Shared helpers for `procgroup` integration tests.

pub mod capture;
pub mod fake_launcher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for any single group run in a test. Real-process tests sleep
/// for a few seconds at most, so hitting this means a unit never finished.
pub const GROUP_DEADLINE: Duration = Duration::from_secs(10);

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Filtered by `RUST_LOG`; defaults to `procgroup=debug` so unit start, kill
/// and exit events show up in the output of a failing test.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,procgroup=debug"));

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Await `f`, panicking if it outlives [`GROUP_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(GROUP_DEADLINE, f).await {
        Ok(value) => value,
        Err(_) => panic!("group did not finish within {GROUP_DEADLINE:?}; a unit was never reaped"),
    }
}
