//! Tracing subscriber setup for hosts embedding the dev tools

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Returns false if a global subscriber was already set; the existing one is
/// left in place.
pub fn init() -> bool {
    init_with_default("info")
}

/// Like [`init`] with a custom fallback filter, e.g. `"devlens_core=debug"`.
pub fn init_with_default(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init()
        .is_ok()
}
