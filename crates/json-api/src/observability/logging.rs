//! Subscriber assembly: level filter, log output and optional span export.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::config::{
    ServerConfig,
    logging::{LogFormat, LoggingConfig},
};

use super::ObservabilityError;

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let span_export = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer()
            .with_tracer(provider.tracer(config.telemetry.otel_service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(output_layer(config.logging.log_format))
        .with(env_filter(&config.logging)?)
        .with(span_export)
        .try_init()?;

    Ok(())
}

fn env_filter(logging: &LoggingConfig) -> Result<EnvFilter, ObservabilityError> {
    Ok(EnvFilter::try_new(logging.filter_directives())?)
}

fn output_layer(format: LogFormat) -> OutputLayer {
    match format {
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        // One object per event with the request span's fields alongside.
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed(),
    }
}
