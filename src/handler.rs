//! Handler abstraction shared by the router, the pipeline and the dispatcher.

use std::sync::Arc;

use crate::context::Context;

/// A request handler
///
/// The engine never looks inside a handler: it invokes it with the request
/// context and reads back whatever status and body were set on it. Any
/// `Fn(&mut Context) + Send + Sync` closure is a handler.
pub trait Handler: Send + Sync {
    fn invoke(&self, ctx: &mut Context);
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn invoke(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// Shared handler reference stored in the trie and threaded through middleware
pub type HandlerRef = Arc<dyn Handler>;
