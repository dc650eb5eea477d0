use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::context::Context;
use crate::handler::HandlerRef;

/// Wraps a handler into a new handler
///
/// A middleware runs its own logic before and/or after calling `next`. Any
/// `Fn(HandlerRef) -> HandlerRef + Send + Sync` closure is a middleware:
///
/// ```rust
/// use brrtdispatch::context::Context;
/// use brrtdispatch::handler::{Handler, HandlerRef};
/// use std::sync::Arc;
///
/// let powered_by = |next: HandlerRef| -> HandlerRef {
///     Arc::new(move |ctx: &mut Context| {
///         next.invoke(ctx);
///         ctx.resp_body.extend_from_slice(b" (brrt)");
///     })
/// };
/// # let _ = powered_by;
/// ```
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: HandlerRef) -> HandlerRef;
}

impl<F> Middleware for F
where
    F: Fn(HandlerRef) -> HandlerRef + Send + Sync,
{
    fn wrap(&self, next: HandlerRef) -> HandlerRef {
        self(next)
    }
}

/// Before/after hooks around the inner chain
///
/// A lighter shape than [`Middleware`] for observers that do not need to
/// own the call to `next`. Adapt it with [`Around`].
pub trait Interceptor: Send + Sync {
    /// Runs before the inner chain. Returning `false` skips the inner chain;
    /// the interceptor is then expected to have set the response itself.
    fn before(&self, _ctx: &mut Context) -> bool {
        true
    }
    /// Runs after the inner chain (or after a short-circuiting `before`)
    fn after(&self, _ctx: &mut Context, _latency: Duration) {}
}

/// Adapts an [`Interceptor`] into a [`Middleware`]
///
/// Holds the interceptor behind an `Arc` so callers can keep a handle, e.g.
/// to read counters from a metrics interceptor.
pub struct Around<I>(Arc<I>);

impl<I: Interceptor> Around<I> {
    pub fn new(interceptor: Arc<I>) -> Self {
        Self(interceptor)
    }
}

impl<I: Interceptor + 'static> Middleware for Around<I> {
    fn wrap(&self, next: HandlerRef) -> HandlerRef {
        let interceptor = Arc::clone(&self.0);
        Arc::new(move |ctx: &mut Context| {
            let start = Instant::now();
            if interceptor.before(ctx) {
                next.invoke(ctx);
            }
            interceptor.after(ctx, start.elapsed());
        })
    }
}

/// Ordered list of middleware, folded once around a terminal handler
///
/// The first middleware pushed ends up outermost: its before-logic runs
/// first and its after-logic runs last.
#[derive(Clone, Default)]
pub struct Pipeline {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Compose every middleware around `terminal` into a single handler
    #[must_use]
    pub fn build(&self, terminal: HandlerRef) -> HandlerRef {
        self.middlewares
            .iter()
            .rev()
            .fold(terminal, |next, middleware| middleware.wrap(next))
    }
}
