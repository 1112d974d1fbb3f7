//! Prometheus collectors for HTTP traffic, cart reconciliation and bearer auth.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const LATENCY_BUCKETS: [f64; 11] = [
    0.002, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Cart mutations tracked by the cart counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CartOperation {
    AddItem,
    UpdateQuantity,
    RemoveItem,
    Clear,
}

impl CartOperation {
    fn as_str(self) -> &'static str {
        match self {
            Self::AddItem => "add_item",
            Self::UpdateQuantity => "update_quantity",
            Self::RemoveItem => "remove_item",
            Self::Clear => "clear",
        }
    }
}

/// How a cart mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CartOutcome {
    Applied,
    StockRejected,
    NotFound,
    Forbidden,
    Invalid,
    Failed,
}

impl CartOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::StockRejected => "stock_rejected",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Invalid => "invalid",
            Self::Failed => "failed",
        }
    }
}

/// Why the bearer middleware turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthRejection {
    MissingToken,
    InvalidToken,
    Failed,
}

impl AuthRejection {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug)]
struct ShopMetrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_requests_in_flight: IntGauge,
    cart_mutations_total: IntCounterVec,
    cart_stock_rejections_total: IntCounterVec,
    auth_rejections_total: IntCounterVec,
}

impl ShopMetrics {
    fn try_build() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("tienda_json".to_owned()), None)?;

        Ok(Self {
            http_requests_total: register(
                &registry,
                IntCounterVec::new(
                    Opts::new("http_requests_total", "HTTP requests by method, route and status."),
                    &["method", "route", "status_class", "status_code"],
                )?,
            )?,
            http_request_duration_seconds: register(
                &registry,
                HistogramVec::new(
                    HistogramOpts::new(
                        "http_request_duration_seconds",
                        "HTTP request latency by method and route.",
                    )
                    .buckets(LATENCY_BUCKETS.to_vec()),
                    &["method", "route"],
                )?,
            )?,
            http_requests_in_flight: register(
                &registry,
                IntGauge::new("http_requests_in_flight", "HTTP requests being served.")?,
            )?,
            cart_mutations_total: register(
                &registry,
                IntCounterVec::new(
                    Opts::new("cart_mutations_total", "Cart mutations by operation and outcome."),
                    &["operation", "outcome"],
                )?,
            )?,
            cart_stock_rejections_total: register(
                &registry,
                IntCounterVec::new(
                    Opts::new(
                        "cart_stock_rejections_total",
                        "Cart mutations refused for insufficient stock.",
                    ),
                    &["operation"],
                )?,
            )?,
            auth_rejections_total: register(
                &registry,
                IntCounterVec::new(
                    Opts::new("auth_rejections_total", "Requests refused by bearer auth."),
                    &["reason"],
                )?,
            )?,
            registry,
        })
    }
}

fn register<C>(registry: &Registry, collector: C) -> prometheus::Result<C>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;

    Ok(collector)
}

static SHOP_METRICS: OnceLock<Option<ShopMetrics>> = OnceLock::new();

fn metrics() -> Option<&'static ShopMetrics> {
    SHOP_METRICS
        .get_or_init(|| {
            ShopMetrics::try_build()
                .inspect_err(|source| error!("failed to build metrics registry: {source}"))
                .ok()
        })
        .as_ref()
}

/// Keeps the in-flight gauge raised while alive.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard(Option<&'static IntGauge>);

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.http_requests_in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self(gauge)
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.0 {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status = status_code.to_string();

    metrics
        .http_requests_total
        .with_label_values(&[method, route, status_class(status_code), status.as_str()])
        .inc();

    metrics
        .http_request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a finished cart mutation; stock refusals also feed their own counter.
pub(crate) fn observe_cart_mutation(operation: CartOperation, outcome: CartOutcome) {
    let Some(metrics) = metrics() else {
        return;
    };

    metrics
        .cart_mutations_total
        .with_label_values(&[operation.as_str(), outcome.as_str()])
        .inc();

    if outcome == CartOutcome::StockRejected {
        metrics
            .cart_stock_rejections_total
            .with_label_values(&[operation.as_str()])
            .inc();
    }
}

pub(crate) fn observe_auth_rejection(reason: AuthRejection) {
    if let Some(metrics) = metrics() {
        metrics
            .auth_rejections_total
            .with_label_values(&[reason.as_str()])
            .inc();
    }
}

fn encode(metrics: &ShopMetrics) -> Result<(HeaderValue, String), String> {
    let encoder = TextEncoder::new();
    let mut body = Vec::new();

    encoder
        .encode(&metrics.registry.gather(), &mut body)
        .map_err(|source| format!("failed to encode metrics: {source}"))?;

    let content_type = HeaderValue::from_str(encoder.format_type())
        .map_err(|source| format!("failed to encode metrics content type: {source}"))?;

    let body = String::from_utf8(body)
        .map_err(|source| format!("metrics output is not utf-8: {source}"))?;

    Ok((content_type, body))
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let encoded = metrics()
        .ok_or_else(|| "metrics registry unavailable".to_owned())
        .and_then(encode);

    match encoded {
        Ok((content_type, body)) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(body);
        }
        Err(message) => {
            error!("{message}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
