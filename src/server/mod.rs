//! Transport-facing side of the engine: the [`ResponseSink`] contract and the
//! finalizer that flushes a context's response state into it.

pub mod response;

pub use response::{flush_response, BufferedSink, ResponseSink};
