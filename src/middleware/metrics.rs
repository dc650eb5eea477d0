use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use http::StatusCode;

use super::Interceptor;
use crate::context::Context;

/// Interceptor collecting request counters
///
/// All counters use atomic operations for thread-safe updates without locks.
/// Register it through [`Around`](super::Around) and keep the `Arc` to read
/// the numbers back.
///
/// Metrics collected:
/// - Total request count
/// - Requests answered with 404 (no route or no handler)
/// - Average latency of the wrapped chain
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    not_found_count: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl MetricsMiddleware {
    /// Create a new metrics middleware with all counters initialized to zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests processed
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Number of requests that ended with a 404 status
    #[must_use]
    pub fn not_found_count(&self) -> usize {
        self.not_found_count.load(Ordering::Relaxed)
    }

    /// Calculate the average request latency
    ///
    /// Returns zero duration if no requests have been processed yet.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Interceptor for MetricsMiddleware {
    fn before(&self, _ctx: &mut Context) -> bool {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn after(&self, ctx: &mut Context, latency: Duration) {
        self.total_latency_ns.fetch_add(
            u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );
        if ctx.resp_status == Some(StatusCode::NOT_FOUND) {
            self.not_found_count.fetch_add(1, Ordering::Relaxed);
        }
    }
}
