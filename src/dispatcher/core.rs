//! Dispatcher core module - hot path for request dispatch.
//!
//! Registration happens on a mutable [`Dispatcher`]. Turning it into a
//! [`Service`] freezes the router and folds the middleware pipeline exactly
//! once; a `Service` has no registration API, so routes cannot change while
//! requests are being served.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::Context;
use crate::handler::{Handler, HandlerRef};
use crate::middleware::{Middleware, Pipeline};
use crate::router::{ConstraintPolicy, RouteError, Router};
use crate::server::{flush_response, BufferedSink, ResponseSink};

/// Body written when no route (or no handler) matches the request
pub const NOT_FOUND_BODY: &[u8] = b"NOT FOUND";

/// Terminal handler at the center of the pipeline
///
/// Looks the request up, binds the path parameters and the matched route
/// onto the context and invokes the route handler. Unmatched requests and
/// matches on intermediate nodes get the fixed 404 response.
struct DispatchHandler {
    router: Arc<Router>,
}

impl Handler for DispatchHandler {
    fn invoke(&self, ctx: &mut Context) {
        let resolved = self
            .router
            .lookup(&ctx.method, &ctx.path)
            .and_then(|matched| Some((matched.handler()?, matched.pattern(), matched)));

        match resolved {
            Some((handler, pattern, matched)) => {
                ctx.path_params = matched.into_path_params();
                if let Some(pattern) = pattern {
                    ctx.set_matched_route(Arc::clone(pattern));
                }
                handler.invoke(ctx);
            }
            None => {
                debug!(method = %ctx.method, path = %ctx.path, "No route matched");
                ctx.resp_status = Some(StatusCode::NOT_FOUND);
                ctx.resp_body = NOT_FOUND_BODY.to_vec();
            }
        }
    }
}

/// Route and middleware registry used during setup
///
/// ```rust
/// use brrtdispatch::context::Context;
/// use brrtdispatch::dispatcher::Dispatcher;
/// use brrtdispatch::middleware::TracingMiddleware;
/// use http::{Method, Request, StatusCode};
///
/// # fn main() -> Result<(), brrtdispatch::router::RouteError> {
/// let mut dispatcher = Dispatcher::new();
/// dispatcher
///     .get("/pets/:id", |ctx: &mut Context| {
///         let id = ctx.path_value("id").into_result().unwrap_or_default();
///         ctx.respond(StatusCode::OK, id);
///     })?
///     .add_middleware(TracingMiddleware);
///
/// let service = dispatcher.into_service();
/// let res = service.handle(Request::get("/pets/7").body(Vec::new()).unwrap());
/// assert_eq!(res.status(), StatusCode::OK);
/// assert_eq!(res.body(), b"7");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Dispatcher {
    router: Router,
    pipeline: Pipeline,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher whose router uses `policy` for regex constraints
    #[must_use]
    pub fn with_policy(policy: ConstraintPolicy) -> Self {
        Self {
            router: Router::with_policy(policy),
            pipeline: Pipeline::new(),
        }
    }

    /// Register a handler for `method` and `path`
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] from the router. Callers should abort startup.
    pub fn route(
        &mut self,
        method: Method,
        path: &str,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.router.register(method, path, Arc::new(handler))?;
        Ok(self)
    }

    pub fn get(&mut self, path: &str, handler: impl Handler + 'static) -> Result<&mut Self, RouteError> {
        self.route(Method::GET, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler + 'static) -> Result<&mut Self, RouteError> {
        self.route(Method::POST, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler + 'static) -> Result<&mut Self, RouteError> {
        self.route(Method::PUT, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: impl Handler + 'static) -> Result<&mut Self, RouteError> {
        self.route(Method::PATCH, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler + 'static) -> Result<&mut Self, RouteError> {
        self.route(Method::DELETE, path, handler)
    }

    /// Add middleware to the processing pipeline
    ///
    /// Middleware runs in the order it's added on the way in and in reverse
    /// order on the way out.
    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.pipeline.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// End the registration phase
    ///
    /// Freezes the router and composes the pipeline around the terminal
    /// dispatch handler. The composed chain is reused for every request.
    #[must_use]
    pub fn into_service(self) -> Service {
        let router = Arc::new(self.router);
        router.log_summary();
        info!(middlewares = self.pipeline.len(), "Middleware pipeline built");

        let terminal: HandlerRef = Arc::new(DispatchHandler {
            router: Arc::clone(&router),
        });
        Service {
            router,
            chain: self.pipeline.build(terminal),
        }
    }
}

/// Frozen router plus composed pipeline, ready to serve requests
///
/// Cheap to clone; clones share the same routing table and chain and can be
/// used from any number of threads at once.
#[derive(Clone)]
pub struct Service {
    router: Arc<Router>,
    chain: HandlerRef,
}

impl Service {
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run the middleware chain and dispatch, without flushing
    pub fn call(&self, ctx: &mut Context) {
        self.chain.invoke(ctx);
    }

    /// Full request cycle: run the chain, then flush the response to `sink`
    ///
    /// The flush is the outermost step and happens after every middleware
    /// has unwound.
    pub fn serve(&self, mut ctx: Context, sink: &mut dyn ResponseSink) {
        self.call(&mut ctx);
        flush_response(&ctx, sink);
    }

    /// Serve an in-memory `http::Request`
    #[must_use]
    pub fn handle(&self, req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let mut sink = BufferedSink::new();
        self.serve(Context::from_request(req), &mut sink);
        sink.into_response()
    }
}
