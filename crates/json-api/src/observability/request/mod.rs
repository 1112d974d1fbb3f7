//! Request spans: request IDs, caller identity, parent traces and completion logs.

mod parent_context;
mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, field, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use crate::extensions::*;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Paths scraped or polled often enough that spans would only add noise.
const UNTRACED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNTRACED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let _in_flight = metrics::InFlightRequestGuard::track();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let names = spans::request_span_name(&method, req.uri().path());

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %names.otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        route = %names.otel_path,
        path = %req.uri().path(),
        remote_addr = %req.remote_addr(),
        user_uuid = field::Empty,
        status = field::Empty,
        duration_ms = field::Empty
    );

    let request_settings = settings::current();

    if request_settings.propagate_parent
        && let Some(upstream) = parent_context::upstream_context(req.headers())
        && let Err(source) = span.set_parent(upstream)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    // The bearer middleware runs inside this hoop, so the caller is known now.
    if let Some(principal) = depot.principal() {
        span.record("user_uuid", field::display(principal.user_uuid));
    }

    let status = request_ids::response_status_or_ok(res.status_code);
    let duration = started.elapsed();

    metrics::observe_request(
        &method,
        &names.otel_path,
        status.as_u16(),
        duration.as_secs_f64(),
    );

    log_completion(&span, status, duration, request_settings.slow_request_threshold);
}

fn log_completion(span: &Span, status: StatusCode, duration: Duration, slow_after: Duration) {
    let duration_ms = duration.as_millis();

    span.record("status", status.as_u16());
    span.record("duration_ms", duration_ms);

    span.in_scope(|| {
        if status.is_server_error() {
            error!(status = status.as_u16(), duration_ms, "request failed");
        } else if status.is_client_error() {
            warn!(status = status.as_u16(), duration_ms, "request rejected");
        } else {
            info!(status = status.as_u16(), duration_ms, "request completed");
        }

        if duration > slow_after {
            warn!(duration_ms, threshold_ms = slow_after.as_millis(), "slow request");
        }
    });
}
