use std::io;

use http::{Response, StatusCode};
use tracing::error;

use crate::context::Context;

/// Transport side of a response
///
/// The dispatcher only needs two operations: set the status line and write
/// the body bytes. Connection handling stays with the implementor.
pub trait ResponseSink {
    fn write_status(&mut self, status: StatusCode);
    /// Write body bytes, returning how many were accepted
    fn write_body(&mut self, body: &[u8]) -> io::Result<usize>;
}

/// In-memory sink producing an `http::Response`
///
/// Like most HTTP transports it answers `200 OK` when no status was written.
#[derive(Debug, Default)]
pub struct BufferedSink {
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl BufferedSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status written so far, if any
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn into_response(self) -> Response<Vec<u8>> {
        let mut res = Response::new(self.body);
        *res.status_mut() = self.status.unwrap_or(StatusCode::OK);
        res
    }
}

impl ResponseSink for BufferedSink {
    fn write_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(body);
        Ok(body.len())
    }
}

/// Flush the response state of `ctx` to `sink`
///
/// Runs once per request after every middleware has unwound. Without an
/// explicit status the sink's default applies. Failed or short writes are
/// logged and never retried: part of the response may already be on the wire.
pub fn flush_response(ctx: &Context, sink: &mut dyn ResponseSink) {
    if let Some(status) = ctx.resp_status {
        sink.write_status(status);
    }
    if ctx.resp_body.is_empty() {
        return;
    }
    match sink.write_body(&ctx.resp_body) {
        Ok(written) if written < ctx.resp_body.len() => error!(
            request_id = %ctx.request_id,
            path = %ctx.path,
            written,
            expected = ctx.resp_body.len(),
            "Short write while flushing response body"
        ),
        Ok(_) => {}
        Err(e) => error!(
            request_id = %ctx.request_id,
            path = %ctx.path,
            error = %e,
            "Failed to flush response body"
        ),
    }
}
