//! Logging bootstrap. Library crates (`chaincore-store`, `chaincore-core`)
//! depend only on `tracing` and emit spans/events; this is the only crate
//! that installs a subscriber.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
