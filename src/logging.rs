//! Console logging for the `msghtml` binary.
//!
//! Logs go to stderr so that stdout carries nothing but the rendered fragment.
//! The level is controlled by `RUST_LOG` (default: `warn`).

use tracing_subscriber::EnvFilter;

pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
