/// Initialize structured JSON logging on stderr.
///
/// Defaults to `error` level unless overridden by `TZ_SPECTRUM_HELPER_LOG`.
///
/// This is independent of the single-line plain-text diagnostic the process
/// contract requires on failure (spec.md §7): that line is written directly
/// with `eprintln!`, not through this subscriber, so it stays exactly the
/// grep-friendly line the calling cache layer expects regardless of whether
/// structured logging is enabled or how verbose it is configured.
#[cfg(feature = "logging")]
pub fn init() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::builder()
        .with_env_var("TZ_SPECTRUM_HELPER_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::ERROR.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init();
}

/// Initialize logging when the `logging` feature is not enabled.
///
/// We keep this as a no-op so library consumers can call `tz_spectrum_helper::logging::init()`
/// without needing to pull in `tracing-subscriber`.
#[cfg(not(feature = "logging"))]
pub fn init() {}
