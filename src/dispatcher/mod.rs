//! # Dispatcher Module
//!
//! The dispatcher ties the router and the middleware pipeline together.
//!
//! ## Lifecycle
//!
//! 1. **Registration** - routes and middleware are added to a [`Dispatcher`].
//!    Malformed or conflicting routes fail immediately with a
//!    [`RouteError`](crate::router::RouteError).
//! 2. **Freeze** - [`Dispatcher::into_service`] moves the router behind an
//!    `Arc` and folds the pipeline around the terminal dispatch handler.
//! 3. **Serving** - [`Service::serve`] runs one request through the chain
//!    and flushes the response to a [`ResponseSink`](crate::server::ResponseSink).
//!
//! ## Request Flow
//!
//! ```text
//! serve ─▶ mw[0].before ─▶ mw[1].before ─▶ dispatch ─▶ handler
//!                                                        │
//! flush ◀─ mw[0].after  ◀─ mw[1].after  ◀────────────────┘
//! ```
//!
//! Requests that match no route, or stop at a node without a handler, get
//! status 404 with the body [`NOT_FOUND_BODY`]; no handler is invoked.

mod core;

pub use self::core::{Dispatcher, Service, NOT_FOUND_BODY};
