//! Upstream trace continuation from `traceparent` headers.

use opentelemetry::{Context, global, propagation::Extractor, trace::TraceContextExt as _};
use salvo::http::{HeaderMap, HeaderName};

#[derive(Debug)]
struct RequestHeaders<'a>(&'a HeaderMap);

impl Extractor for RequestHeaders<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// The caller's span context, when the request carries a valid one.
pub(super) fn upstream_context(headers: &HeaderMap) -> Option<Context> {
    let context = global::get_text_map_propagator(|propagator| {
        // An empty base keeps the server's own active span out of the result.
        propagator.extract_with_context(&Context::new(), &RequestHeaders(headers))
    });

    let carries_trace = context.span().span_context().is_valid();

    carries_trace.then_some(context)
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::header::HeaderValue;
    use testresult::TestResult;

    use super::*;

    const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";

    fn headers_with_traceparent(traceparent: &str) -> TestResult<HeaderMap> {
        global::set_text_map_propagator(TraceContextPropagator::new());

        let mut headers = HeaderMap::new();
        headers.insert("traceparent", HeaderValue::from_str(traceparent)?);

        Ok(headers)
    }

    #[test]
    fn valid_traceparent_continues_the_callers_trace() -> TestResult {
        let headers = headers_with_traceparent(&format!("00-{TRACE_ID}-00f067aa0ba902b7-01"))?;

        let context = upstream_context(&headers).ok_or("expected an upstream context")?;
        let span = context.span();

        assert_eq!(span.span_context().trace_id().to_string(), TRACE_ID);
        assert!(span.span_context().is_remote(), "parent should be remote");

        Ok(())
    }

    #[test]
    fn malformed_traceparent_starts_a_new_trace() -> TestResult {
        let headers = headers_with_traceparent("00-not-a-trace-01")?;

        assert!(upstream_context(&headers).is_none(), "garbage was accepted");

        Ok(())
    }

    #[test]
    fn requests_without_trace_headers_have_no_parent() {
        global::set_text_map_propagator(TraceContextPropagator::new());

        assert!(upstream_context(&HeaderMap::new()).is_none(), "no header, no parent");
    }
}
