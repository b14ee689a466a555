use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the fmt subscriber used by every binary in the workspace.
///
/// Defaults to `info`; `RUST_LOG` overrides the filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
