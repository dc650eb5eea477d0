use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::Middleware;
use crate::context::Context;
use crate::handler::HandlerRef;

type LogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// One access log line, serialized as JSON
#[derive(Debug, Serialize)]
struct AccessLog<'a> {
    host: &'a str,
    route: &'a str,
    http_method: &'a str,
    path: &'a str,
    status: Option<u16>,
}

/// Emits a JSON access record after the inner chain completes
///
/// The record carries the matched route pattern, so it should be placed
/// outside of anything that short-circuits dispatch. By default lines go to
/// `tracing` at INFO level under the `access_log` target.
#[derive(Clone)]
pub struct AccessLogMiddleware {
    log_fn: LogFn,
}

impl Default for AccessLogMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessLogMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_fn: Arc::new(|line: &str| info!(target: "access_log", "{line}")),
        }
    }

    /// Send access lines to `f` instead of `tracing`
    #[must_use]
    pub fn with_log_fn(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            log_fn: Arc::new(f),
        }
    }
}

impl Middleware for AccessLogMiddleware {
    fn wrap(&self, next: HandlerRef) -> HandlerRef {
        let log_fn = Arc::clone(&self.log_fn);
        Arc::new(move |ctx: &mut Context| {
            next.invoke(ctx);

            let record = AccessLog {
                host: ctx.host().unwrap_or_default(),
                route: ctx.matched_route().unwrap_or_default(),
                http_method: ctx.method.as_str(),
                path: &ctx.path,
                status: ctx.resp_status.map(|s| s.as_u16()),
            };
            match serde_json::to_string(&record) {
                Ok(line) => log_fn(&line),
                Err(e) => warn!(error = %e, "Failed to serialize access log record"),
            }
        })
    }
}
