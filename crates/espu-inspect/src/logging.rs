use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global tracing subscriber for inspection output.
///
/// Verbosity comes from `RUST_LOG`, defaulting to `info`. Unknown components
/// and version drift are reported at `warn`. Fails if a global subscriber is
/// already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
