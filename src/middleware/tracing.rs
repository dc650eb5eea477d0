use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, field, info_span};

use super::Middleware;
use crate::context::Context;
use crate::handler::HandlerRef;

/// Opens one `request` span per request
///
/// The span is entered around the whole inner chain, so events emitted by
/// inner middleware and handlers are attached to it. Once the chain unwinds
/// the matched route pattern and the response status are recorded on it.
///
/// Span names are static in `tracing`, so the span is always named `request`.
/// The matched route goes into the `route` field instead of the name, and
/// stays empty for unmatched requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn wrap(&self, next: HandlerRef) -> HandlerRef {
        Arc::new(move |ctx: &mut Context| {
            let span = info_span!(
                "request",
                method = %ctx.method,
                path = %ctx.path,
                request_id = %ctx.request_id,
                route = field::Empty,
                status = field::Empty,
            );
            let _guard = span.enter();
            let start = Instant::now();

            next.invoke(ctx);

            if let Some(route) = ctx.matched_route() {
                span.record("route", route);
            }
            if let Some(status) = ctx.resp_status {
                span.record("status", status.as_u16());
            }
            debug!(
                latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
                "Request completed"
            );
        })
    }
}
