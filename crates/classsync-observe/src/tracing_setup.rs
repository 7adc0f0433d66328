//! Global subscriber setup for the `classsync` binary.
//!
//! ```no_run
//! classsync_observe::tracing_setup::init_tracing("warn", false).unwrap();
//! // ... run the command ...
//! classsync_observe::tracing_setup::shutdown_tracing();
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Set once when span export is enabled; flushed by [`shutdown_tracing`].
static SPAN_EXPORT: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Install the global subscriber.
///
/// Log lines go to stderr so `--json` output on stdout stays parseable.
/// `RUST_LOG`, when set, takes precedence over `default_filter`. With
/// `export_spans`, spans are also printed through the OpenTelemetry stdout
/// exporter.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(
    default_filter: &str,
    export_spans: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let otel = export_spans.then(span_export_layer);

    // The export layer sits directly on the registry; the filter still
    // applies to every layer.
    tracing_subscriber::registry()
        .with(otel)
        .with(filter_from_env(default_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}

/// Flush and stop span export. Does nothing if it was never enabled.
pub fn shutdown_tracing() {
    let Some(provider) = SPAN_EXPORT.get() else {
        return;
    };
    if let Err(e) = provider.shutdown() {
        eprintln!("Warning: failed to flush exported spans: {e}");
    }
}

fn filter_from_env(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

fn span_export_layer() -> OpenTelemetryLayer<Registry, SdkTracer> {
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build();
    let tracer = provider.tracer("classsync");

    let _ = SPAN_EXPORT.set(provider.clone());
    opentelemetry::global::set_tracer_provider(provider);

    tracing_opentelemetry::layer().with_tracer(tracer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_without_export_is_noop() {
        shutdown_tracing();
        assert!(SPAN_EXPORT.get().is_none());
    }

    #[test]
    fn test_default_filter_used_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(filter_from_env("warn").to_string(), "warn");
    }
}
