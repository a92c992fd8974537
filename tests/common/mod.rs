#![allow(dead_code)]

use std::error::Error;
use std::time::Duration;

use nodebridge::exec::MIN_POLL_INTERVAL;
use nodebridge::BridgeOptions;

pub type TestResult = Result<(), Box<dyn Error>>;

pub fn init_tracing() {
    nodebridge_test_utils::init_tracing();
}

/// Shortest allowed interval so tests that wait on liveness stay fast.
pub fn fast_options() -> BridgeOptions {
    BridgeOptions {
        poll_interval: MIN_POLL_INTERVAL,
    }
}

/// An interval far longer than any test, to prove that completion is not
/// waited out.
pub fn slow_options() -> BridgeOptions {
    BridgeOptions {
        poll_interval: Duration::from_secs(30),
    }
}
