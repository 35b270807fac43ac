//! Logging set-up for the secret demo.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

mod env;

pub use env::LogFormat;

/// Installs the global tracing subscriber.
///
/// Events go to stderr, filtered by `RUST_LOG` (default `info`), in the
/// format chosen by `SECRET_DEMO_LOG_FORMAT`.
pub fn init_globally() -> anyhow::Result<()> {
    init_with_format(LogFormat::from_env())
}

pub fn init_with_format(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env()?
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("azure_core=warn".parse()?);

    let fmt_layer = match format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install the tracing subscriber: {e}"))
}
