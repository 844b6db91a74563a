#![allow(dead_code, unused_imports)]

pub use flowrun_test_utils::builders;
pub use flowrun_test_utils::fake_backend::RecordingBackend;
pub use flowrun_test_utils::{init_tracing, with_timeout, TEST_TIMEOUT};
