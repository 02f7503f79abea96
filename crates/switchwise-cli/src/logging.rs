//! Diagnostic tracing for the CLI and the HTTP service.
//!
//! Reads `RUST_LOG`, defaulting to `warn`. Output goes to stderr so command
//! output on stdout stays machine-readable.
//!
//! ```bash
//! RUST_LOG=switchwise_core=debug switchwise classify "YouTube - cats"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    init_with_default("warn");
}

/// Like [`init`] but with a custom fallback directive when `RUST_LOG` is unset.
pub fn init_with_default(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
