use super::config::TracingLevel;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the diagnostics subscriber.
///
/// `RUST_LOG` wins over `default_level` when set; unparsable directives in it
/// are skipped. Output is JSON when
/// `RUST_LOG_FORMAT=json`, compact text otherwise. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(
    default_level: TracingLevel,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let use_json = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let filter = diagnostics_filter(default_level);

    if use_json {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    }

    Ok(())
}

fn diagnostics_filter(default_level: TracingLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level.into()).into())
        .from_env_lossy()
}
