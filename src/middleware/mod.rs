//! # Middleware Module
//!
//! Middleware wraps request handling. The [`Pipeline`] folds an ordered list
//! of [`Middleware`] around the dispatcher's terminal handler once, at setup;
//! the first middleware added is outermost.
//!
//! Two shapes are supported:
//!
//! - [`Middleware`] - `wrap(next) -> handler`, full control over the call
//! - [`Interceptor`] - `before`/`after` hooks, adapted with [`Around`]
//!
//! The middlewares shipped here (access log, tracing, metrics) are ordinary
//! consumers of these interfaces.

mod access_log;
mod core;
mod metrics;
mod tracing;

pub use access_log::AccessLogMiddleware;
pub use self::core::{Around, Interceptor, Middleware, Pipeline};
pub use metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
