use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::settings::ClientSettings;

const APP_NAME: &str = "library_manager";

/// Logs go to stderr, stdout belongs to the terminal front end.
/// Must be called from within the tokio runtime when Jaeger export is enabled
pub fn init_telemetry(settings: &ClientSettings) -> anyhow::Result<()> {
    // Tunable via `RUST_LOG` env variable
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    // Spans of outgoing requests carry the trace context, so client and backend spans join up in Jaeger
    let telemetry = if settings.jaeger_enabled {
        global::set_text_map_propagator(TraceContextPropagator::new());
        #[allow(deprecated)]
        let tracer = opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name(APP_NAME)
            .install_batch(TokioCurrentThread)
            .context("Failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    let formatting_layer = BunyanFormattingLayer::new(APP_NAME.into(), std::io::stderr);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install `tracing` subscriber")
}
