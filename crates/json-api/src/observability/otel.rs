//! OTLP span export.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::telemetry::TelemetryConfig;

use super::ObservabilityError;

pub(super) fn build_tracer_provider(
    telemetry: &TelemetryConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(telemetry.otel_exporter_otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(
            telemetry.otel_exporter_otlp_timeout_seconds,
        ))
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler(telemetry.otel_trace_sample_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource(telemetry))
        .with_batch_exporter(exporter)
        .build())
}

fn resource(telemetry: &TelemetryConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(telemetry.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", telemetry.otel_service_version.clone()),
            KeyValue::new(
                "deployment.environment.name",
                telemetry.otel_deployment_environment.clone(),
            ),
        ])
        .build()
}

/// Upstream sampling decisions win; new root traces use `ratio`.
fn sampler(ratio: f64) -> Sampler {
    Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(ratio)))
}
