//! # Router Module
//!
//! The router module provides path matching and route resolution for
//! brrtdispatch. Routes are stored in one segment trie per HTTP method and
//! matched in time proportional to the number of path segments.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Validating route patterns and rejecting conflicts at registration time
//! - Matching incoming requests to registered routes
//! - Extracting path parameters from matched routes
//! - Exposing the canonical pattern of the matched route for observability
//!
//! ## Pattern Syntax
//!
//! | token | meaning |
//! |---|---|
//! | `users` | exact match |
//! | `:id` | parameter bound to `id` |
//! | `:id(\d+)` | parameter with a regex constraint |
//! | `*` | one segment, or every remaining segment when nothing is registered below it |
//!
//! ## Example
//!
//! ```rust
//! use brrtdispatch::context::Context;
//! use brrtdispatch::router::Router;
//! use http::Method;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), brrtdispatch::router::RouteError> {
//! let mut router = Router::new();
//! router.register(Method::GET, "/users/:id", Arc::new(|_ctx: &mut Context| {}))?;
//!
//! let matched = router.lookup(&Method::GET, "/users/42").expect("route");
//! assert_eq!(matched.get_path_param("id"), Some("42"));
//! assert_eq!(matched.pattern().map(|p| &**p), Some("/users/:id"));
//! # Ok(())
//! # }
//! ```

mod core;
mod error;
mod trie;

pub use self::core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
#[cfg(test)]
pub(crate) use self::core::bind_param;
pub use error::RouteError;
pub use trie::{ConstraintPolicy, NodeKind, RouteNode};
