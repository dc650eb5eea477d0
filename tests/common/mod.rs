#![allow(dead_code)]

pub mod log_capture {
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing::Level;

    /// Shared in-memory buffer used as a `tracing-subscriber` writer
    #[derive(Clone, Default)]
    pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }

        pub fn lines(&self) -> Vec<String> {
            self.contents().lines().map(str::to_string).collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a JSON subscriber scoped to the current thread
    ///
    /// Returns whatever was logged at DEBUG and above while `f` ran.
    pub fn capture_json<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_max_level(Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs)
    }
}

pub mod sinks {
    use std::io;

    use brrtdispatch::server::ResponseSink;
    use http::StatusCode;

    /// Sink accepting at most `limit` body bytes per write
    #[derive(Debug)]
    pub struct ShortSink {
        pub limit: usize,
        pub status: Option<StatusCode>,
        pub body: Vec<u8>,
    }

    impl ShortSink {
        pub fn new(limit: usize) -> Self {
            Self {
                limit,
                status: None,
                body: Vec::new(),
            }
        }
    }

    impl ResponseSink for ShortSink {
        fn write_status(&mut self, status: StatusCode) {
            self.status = Some(status);
        }

        fn write_body(&mut self, body: &[u8]) -> io::Result<usize> {
            let n = body.len().min(self.limit);
            self.body.extend_from_slice(&body[..n]);
            Ok(n)
        }
    }

    /// Sink whose connection is already gone
    #[derive(Debug, Default)]
    pub struct BrokenSink {
        pub status: Option<StatusCode>,
    }

    impl ResponseSink for BrokenSink {
        fn write_status(&mut self, status: StatusCode) {
            self.status = Some(status);
        }

        fn write_body(&mut self, _body: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection closed"))
        }
    }
}
