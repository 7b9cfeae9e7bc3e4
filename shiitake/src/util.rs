use tracing::dispatcher::DefaultGuard;

pub(crate) fn trace_init() -> DefaultGuard {
    trace_init_with_default("shiitake=trace,hyphae=trace")
}

/// Initialize tracing with the given filter directive, unless `RUST_LOG` (or
/// `LOOM_LOG`, under loom) is set.
///
/// The returned guard must be held for the duration of the test.
pub(crate) fn trace_init_with_default(default: &str) -> DefaultGuard {
    use tracing_subscriber::{
        filter::{EnvFilter, LevelFilter},
        util::SubscriberInitExt,
    };
    const ENV: &str = if cfg!(loom) { "LOOM_LOG" } else { "RUST_LOG" };

    let env = std::env::var(ENV).unwrap_or_default();
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    let filter = if env.is_empty() {
        builder.parse_lossy(default)
    } else {
        builder.parse_lossy(env)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .with_target(false)
        .finish()
        .set_default()
}

#[allow(dead_code)]
pub(crate) fn assert_send<T: Send>() {}
