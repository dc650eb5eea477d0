//! Router core module - hot path for request routing.
//!
//! # Allocation discipline
//!
//! Lookup allocates only the bound parameter values, decoded from their
//! percent-encoded form. Parameter names are
//! `Arc<str>` handles into the frozen trie and bindings live in a `SmallVec`
//! that stays on the stack for the common case.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::RouteError;
use super::trie::{ConstraintPolicy, PathSegment, RouteNode};
use crate::handler::HandlerRef;

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/:id/posts/:post_id).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the trie (known at
/// startup); values are per-request data taken from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Bind `value` under `name`, replacing an earlier binding of the same name
///
/// Keys stay unique: for `/org/:id/user/:id` the deeper segment wins. The
/// value is percent-decoded; matching already happened on the raw segment,
/// so an encoded `%2F` never splits a parameter. Values that do not decode
/// to UTF-8 are bound raw.
pub(crate) fn bind_param(params: &mut ParamVec, name: &Arc<str>, value: &str) {
    let value = urlencoding::decode(value).unwrap_or(Cow::Borrowed(value));
    match params.iter_mut().find(|(k, _)| k == name) {
        Some((_, v)) => {
            v.clear();
            v.push_str(&value);
        }
        None => params.push((Arc::clone(name), value.into_owned())),
    }
}

/// Result of walking the trie for a request path
///
/// The matched node may be an intermediate node without a handler, e.g.
/// `/a` when only `/a/*` is registered. Dispatch treats that as not found.
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    node: &'r RouteNode,
    path_params: ParamVec,
}

impl<'r> RouteMatch<'r> {
    /// Node where the walk ended
    #[must_use]
    pub fn node(&self) -> &'r RouteNode {
        self.node
    }

    /// Handler of the matched node, `None` for intermediate nodes
    #[must_use]
    pub fn handler(&self) -> Option<&'r HandlerRef> {
        self.node.handler()
    }

    /// Registration pattern of the matched route (e.g. `/users/:id`)
    #[must_use]
    pub fn pattern(&self) -> Option<&'r Arc<str>> {
        self.node.pattern()
    }

    /// Bound path parameters, in path order
    #[must_use]
    pub fn path_params(&self) -> &ParamVec {
        &self.path_params
    }

    /// Consume the match, keeping only the bindings
    #[must_use]
    pub fn into_path_params(self) -> ParamVec {
        self.path_params
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to HashMap for compatibility with existing code
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Router holding one route trie per HTTP method
///
/// Routes are added with [`Router::register`] during setup. Once wrapped in
/// an `Arc` by the dispatcher the router is never mutated again, so
/// concurrent lookups need no locking.
///
/// # Performance
///
/// - Registration: O(k) where k is the number of path segments
/// - Lookup: O(k), independent of the number of registered routes
pub struct Router {
    trees: HashMap<Method, RouteNode>,
    policy: ConstraintPolicy,
    route_count: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create an empty router using [`ConstraintPolicy::Permissive`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(ConstraintPolicy::default())
    }

    /// Create an empty router with an explicit regex constraint policy
    #[must_use]
    pub fn with_policy(policy: ConstraintPolicy) -> Self {
        Self {
            trees: HashMap::new(),
            policy,
            route_count: 0,
        }
    }

    #[must_use]
    pub fn policy(&self) -> ConstraintPolicy {
        self.policy
    }

    /// Number of registered routes across all methods
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.route_count
    }

    /// Register `handler` for `method` and `path`
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the path is malformed or conflicts with
    /// a route already registered. See the variants for the exact rules.
    /// A failed registration leaves the routing table unchanged.
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        handler: HandlerRef,
    ) -> Result<(), RouteError> {
        validate_path(path)?;
        let segments = if path == "/" {
            Vec::new()
        } else {
            path[1..]
                .split('/')
                .map(PathSegment::parse)
                .collect::<Result<Vec<_>, _>>()?
        };

        // Check the whole path before creating any node
        if let Some(root) = self.trees.get(&method) {
            let mut existing = Some(root);
            for segment in &segments {
                match existing {
                    Some(node) => existing = node.existing_child(segment, path)?,
                    None => break,
                }
            }
            if existing.is_some_and(|node| node.handler().is_some()) {
                return Err(RouteError::DuplicateRoute {
                    method,
                    path: path.to_string(),
                });
            }
        }

        let mut node = self
            .trees
            .entry(method.clone())
            .or_insert_with(RouteNode::root);
        for segment in segments {
            node = node.insert_child(segment);
        }
        node.attach(handler, path);
        self.route_count += 1;
        debug!(method = %method, path = %path, "Route registered");
        Ok(())
    }

    /// Match `method` and `path` against the registered routes
    ///
    /// Returns `None` when no tree exists for the method or some segment has
    /// no matching child. A returned match may still lack a handler.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let mut node = self.trees.get(method)?;
        let mut path_params = ParamVec::new();

        let trimmed = path.trim_matches('/');
        if !trimmed.is_empty() {
            for segment in trimmed.split('/') {
                if node.is_leaf_wildcard() {
                    break;
                }
                let (child, param) = node.next(segment, self.policy)?;
                if let Some(name) = param {
                    bind_param(&mut path_params, name, segment);
                }
                node = child;
            }
        }

        Some(RouteMatch { node, path_params })
    }

    /// All registered routes as `(method, pattern)`, sorted
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, Arc<str>)> {
        let mut routes = Vec::with_capacity(self.route_count);
        for (method, root) in &self.trees {
            root.for_each_route(&mut |pattern| routes.push((method.clone(), Arc::clone(pattern))));
        }
        routes.sort_by(|a, b| (a.0.as_str(), &a.1).cmp(&(b.0.as_str(), &b.1)));
        routes
    }

    /// Print all registered routes to stdout
    ///
    /// Useful for debugging and verifying that routes are loaded correctly.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.route_count);
        for (method, pattern) in self.routes() {
            println!("[route] {method} {pattern}");
        }
    }

    /// Log a summary of the routing table
    pub(crate) fn log_summary(&self) {
        let routes_summary: Vec<String> = self
            .routes()
            .iter()
            .take(10)
            .map(|(method, pattern)| format!("{method} {pattern}"))
            .collect();
        info!(
            routes_count = self.route_count,
            methods = self.trees.len(),
            policy = ?self.policy,
            routes_summary = ?routes_summary,
            routing_algorithm = "segment_trie",
            "Routing table loaded"
        );
    }
}

fn validate_path(path: &str) -> Result<(), RouteError> {
    if path.is_empty() {
        return Err(RouteError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash {
            path: path.to_string(),
        });
    }
    if path == "/" {
        return Ok(());
    }
    if path.ends_with('/') {
        return Err(RouteError::TrailingSlash {
            path: path.to_string(),
        });
    }
    if path[1..].split('/').any(str::is_empty) {
        return Err(RouteError::EmptySegment {
            path: path.to_string(),
        });
    }
    Ok(())
}
