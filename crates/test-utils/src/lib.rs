//! Fakes and builders shared by the `nodebridge` integration tests.

pub mod builders;
pub mod fake_runner;
pub mod fake_storage;
pub mod recording_logger;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Output goes through the test writer, so it only shows for failing tests
/// unless run with `--nocapture`. The filter comes from `NODEBRIDGE_LOG`
/// (e.g. `NODEBRIDGE_LOG=nodebridge=debug`), defaulting to `info` with the
/// forwarded execution logs under `nodebridge::ctx` at `debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("NODEBRIDGE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info,nodebridge::ctx=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Bound on any single bridge invocation in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a future, panicking if it does not finish within [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("bridge invocation did not finish within the test timeout")
}
