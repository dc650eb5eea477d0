//! # brrtdispatch
//!
//! **brrtdispatch** is an HTTP request dispatch engine: a segment-trie router
//! with static, parameter, regex-constrained and wildcard segments, composed
//! with an ordered middleware pipeline that wraps request handling and the
//! final response flush.
//!
//! ## Architecture
//!
//! - **[`router`]** - Per-method route tries, registration-time conflict detection and lookup
//! - **[`middleware`]** - Middleware/interceptor traits, the pipeline fold and bundled middlewares
//! - **[`dispatcher`]** - Registration phase ([`Dispatcher`](dispatcher::Dispatcher)) and
//!   serving phase ([`Service`](dispatcher::Service))
//! - **[`context`]** - Per-request data and response state
//! - **[`server`]** - The [`ResponseSink`](server::ResponseSink) contract and the response flush
//! - **[`runtime_config`]** / **[`logging`]** - Configuration and structured logging setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Transport
//!     participant Service
//!     participant Middleware as Middleware Chain
//!     participant Dispatch as Dispatch Handler
//!     participant Router
//!     participant Handler
//!
//!     Transport->>Service: serve(ctx, sink)
//!     Service->>Middleware: before hooks (registration order)
//!     Middleware->>Dispatch: invoke(ctx)
//!     Dispatch->>Router: lookup(method, path)
//!
//!     alt No route, or node without handler
//!         Router-->>Dispatch: None
//!         Dispatch->>Dispatch: 404 "NOT FOUND"
//!     else Match
//!         Router-->>Dispatch: RouteMatch (node, params)
//!         Dispatch->>Dispatch: bind params + matched route on ctx
//!         Dispatch->>Handler: invoke(ctx)
//!         Handler-->>Dispatch: status/body set on ctx
//!     end
//!
//!     Dispatch-->>Middleware: unwind
//!     Middleware-->>Service: after hooks (reverse order)
//!     Service->>Transport: flush status + body to sink
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtdispatch::context::Context;
//! use brrtdispatch::dispatcher::Dispatcher;
//! use brrtdispatch::middleware::{AccessLogMiddleware, TracingMiddleware};
//! use http::{Request, StatusCode};
//!
//! # fn main() -> Result<(), brrtdispatch::router::RouteError> {
//! let mut dispatcher = Dispatcher::new();
//! dispatcher
//!     .get("/users/:id", |ctx: &mut Context| {
//!         let id = ctx.path_value("id").into_result().unwrap_or_default();
//!         ctx.respond(StatusCode::OK, format!("user {id}"));
//!     })?
//!     .get("/assets/*", |ctx: &mut Context| ctx.respond(StatusCode::OK, "asset"))?;
//! dispatcher
//!     .add_middleware(TracingMiddleware)
//!     .add_middleware(AccessLogMiddleware::new());
//!
//! // Registration ends here; the service is immutable and shareable.
//! let service = dispatcher.into_service();
//!
//! let res = service.handle(Request::get("/users/42").body(Vec::new()).unwrap());
//! assert_eq!(res.body(), b"user 42");
//!
//! let res = service.handle(Request::get("/assets/css/site.css").body(Vec::new()).unwrap());
//! assert_eq!(res.body(), b"asset");
//!
//! let res = service.handle(Request::get("/nope").body(Vec::new()).unwrap());
//! assert_eq!(res.status(), StatusCode::NOT_FOUND);
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime Considerations
//!
//! - Routes can only be added before [`Dispatcher::into_service`](dispatcher::Dispatcher::into_service);
//!   the frozen router is shared without locks.
//! - Lookup performs no I/O and runs in time proportional to the number of path segments.
//! - Handlers and middleware run on the caller's thread and may block; timeouts and
//!   cancellation belong to the transport.

pub mod cli;
pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use context::Context;
pub use dispatcher::{Dispatcher, Service};
pub use handler::{Handler, HandlerRef};
pub use router::{ConstraintPolicy, RouteError, Router};
