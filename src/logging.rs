//! Logging bootstrap for binaries embedding the framework.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with an env-filtered fmt subscriber.
///
/// Respects `RUST_LOG`; defaults to `frontline=info`. Safe to call more
/// than once; later calls are ignored.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frontline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
