//! Segment trie used by [`Router`](super::Router) for route matching
//!
//! Each HTTP method owns one tree. A node represents one `/`-delimited path
//! segment and exclusively owns its children, so traversal is strictly
//! top-down and needs no back-references.
//!
//! ## Node kinds
//!
//! - **Static** children match a segment exactly and are keyed by it
//! - **Parameter** child (`:name` or `:name(regex)`), at most one per node
//! - **Wildcard** child (`*`), at most one per node
//!
//! A parameter child and a wildcard child never share a parent. A single node
//! may still carry static children together with one of them.
//!
//! ## Lookup precedence
//!
//! Most specific first: a confirmed leaf wildcard absorbs everything that is
//! left, then static, then parameter, then a wildcard consuming one segment.
//! There is no backtracking: once a segment picked a child, later segments
//! never revisit that choice.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;

use super::error::RouteError;
use crate::handler::HandlerRef;

/// What to do when a segment does not satisfy a `:name(regex)` constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintPolicy {
    /// Bind the raw segment under the parameter name anyway
    ///
    /// This keeps routes such as `/x/:id(\d+)` reachable for `/x/abc`; the
    /// constraint only documents intent.
    #[default]
    Permissive,
    /// The parameter child does not match a segment that fails its constraint
    Strict,
}

impl ConstraintPolicy {
    /// Parse a policy name, falling back to [`ConstraintPolicy::Permissive`]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "strict" | "reject" => ConstraintPolicy::Strict,
            _ => ConstraintPolicy::Permissive,
        }
    }
}

/// Kind of a trie node, decided by the syntax of its segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Literal segment (and the per-method root)
    Static,
    /// `:name` or `:name(regex)`
    Param,
    /// `*`
    Wildcard,
}

/// Declared name and optional constraint of a parameter node
#[derive(Debug)]
struct ParamSpec {
    name: Arc<str>,
    constraint: Option<Regex>,
}

/// One parsed path segment of a registration pattern
enum Segment<'p> {
    Static,
    Wildcard,
    Param {
        name: &'p str,
        constraint: Option<&'p str>,
    },
}

impl<'p> Segment<'p> {
    fn parse(segment: &'p str) -> Result<Self, RouteError> {
        if segment == "*" {
            return Ok(Segment::Wildcard);
        }
        let Some(rest) = segment.strip_prefix(':') else {
            return Ok(Segment::Static);
        };
        let invalid = || RouteError::InvalidParameter {
            segment: segment.to_string(),
        };
        match rest.find('(') {
            None => {
                if rest.is_empty() || rest.contains(')') {
                    return Err(invalid());
                }
                Ok(Segment::Param {
                    name: rest,
                    constraint: None,
                })
            }
            Some(open) => {
                let name = &rest[..open];
                let pattern = rest[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
                if name.is_empty() || pattern.is_empty() {
                    return Err(invalid());
                }
                Ok(Segment::Param {
                    name,
                    constraint: Some(pattern),
                })
            }
        }
    }
}

/// A registration segment with its constraint compiled, ready to insert
pub(crate) struct PathSegment<'p> {
    raw: &'p str,
    kind: SegmentKind<'p>,
}

enum SegmentKind<'p> {
    Static,
    Wildcard,
    Param {
        name: &'p str,
        constraint: Option<Regex>,
    },
}

impl<'p> PathSegment<'p> {
    pub(crate) fn parse(raw: &'p str) -> Result<Self, RouteError> {
        let kind = match Segment::parse(raw)? {
            Segment::Static => SegmentKind::Static,
            Segment::Wildcard => SegmentKind::Wildcard,
            Segment::Param { name, constraint } => SegmentKind::Param {
                name,
                constraint: constraint
                    .map(|pattern| {
                        Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                            RouteError::InvalidRegex {
                                segment: raw.to_string(),
                                reason: e.to_string(),
                            }
                        })
                    })
                    .transpose()?,
            },
        };
        Ok(Self { raw, kind })
    }
}

/// Node of the route trie
///
/// Nodes are only reachable through a [`RouteMatch`](super::RouteMatch) once
/// the router is built; they expose read-only accessors.
pub struct RouteNode {
    /// Raw segment text as registered (`users`, `:id(\d+)`, `*`, or `/` for a root)
    segment: Box<str>,
    kind: NodeKind,
    children: HashMap<Box<str>, RouteNode>,
    param_child: Option<Box<RouteNode>>,
    wildcard_child: Option<Box<RouteNode>>,
    param: Option<ParamSpec>,
    handler: Option<HandlerRef>,
    /// Registration pattern of the route terminating here
    pattern: Option<Arc<str>>,
}

impl RouteNode {
    pub(crate) fn root() -> Self {
        Self::with_kind("/", NodeKind::Static)
    }

    fn with_kind(segment: &str, kind: NodeKind) -> Self {
        Self {
            segment: segment.into(),
            kind,
            children: HashMap::new(),
            param_child: None,
            wildcard_child: None,
            param: None,
            handler: None,
            pattern: None,
        }
    }

    fn param(segment: &str, name: &str, constraint: Option<Regex>) -> Self {
        let mut node = Self::with_kind(segment, NodeKind::Param);
        node.param = Some(ParamSpec {
            name: Arc::from(name),
            constraint,
        });
        node
    }

    /// Raw segment this node was registered with
    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Handler attached to this node, `None` for intermediate nodes
    pub fn handler(&self) -> Option<&HandlerRef> {
        self.handler.as_ref()
    }

    /// Registration pattern of the route ending at this node
    pub fn pattern(&self) -> Option<&Arc<str>> {
        self.pattern.as_ref()
    }

    /// Declared parameter name for parameter nodes
    pub fn param_name(&self) -> Option<&str> {
        self.param.as_ref().map(|p| p.name.as_ref())
    }

    /// A wildcard with no structure below it
    ///
    /// Such a node absorbs every remaining segment of a lookup. The trie is
    /// frozen before serving, so the answer never changes between lookups.
    pub fn is_leaf_wildcard(&self) -> bool {
        self.kind == NodeKind::Wildcard
            && self.children.is_empty()
            && self.param_child.is_none()
            && self.wildcard_child.is_none()
    }

    /// Existing child for `segment`, or the conflict inserting it would cause
    ///
    /// Read-only: registration checks a whole path with this before
    /// touching the trie, so a failed registration leaves it unchanged.
    pub(crate) fn existing_child(
        &self,
        segment: &PathSegment<'_>,
        path: &str,
    ) -> Result<Option<&RouteNode>, RouteError> {
        let conflict = || RouteError::WildcardParamConflict {
            path: path.to_string(),
            segment: segment.raw.to_string(),
        };
        match segment.kind {
            SegmentKind::Static => Ok(self.children.get(segment.raw)),
            SegmentKind::Wildcard => {
                if self.param_child.is_some() {
                    return Err(conflict());
                }
                Ok(self.wildcard_child.as_deref())
            }
            SegmentKind::Param { .. } => {
                if self.wildcard_child.is_some() {
                    return Err(conflict());
                }
                match self.param_child.as_deref() {
                    Some(existing) if existing.segment.as_ref() != segment.raw => {
                        Err(RouteError::ParamConflict {
                            existing: existing.segment.to_string(),
                            new: segment.raw.to_string(),
                        })
                    }
                    existing => Ok(existing),
                }
            }
        }
    }

    /// Find the child for `segment`, creating it if needed
    ///
    /// The segment must have passed [`RouteNode::existing_child`] first.
    pub(crate) fn insert_child(&mut self, segment: PathSegment<'_>) -> &mut RouteNode {
        let PathSegment { raw, kind } = segment;
        match kind {
            SegmentKind::Static => self
                .children
                .entry(raw.into())
                .or_insert_with(|| RouteNode::with_kind(raw, NodeKind::Static)),
            SegmentKind::Wildcard => &mut **self
                .wildcard_child
                .get_or_insert_with(|| Box::new(RouteNode::with_kind("*", NodeKind::Wildcard))),
            SegmentKind::Param { name, constraint } => &mut **self
                .param_child
                .get_or_insert_with(|| Box::new(RouteNode::param(raw, name, constraint))),
        }
    }

    /// Attach the handler of a route ending at this node
    pub(crate) fn attach(&mut self, handler: HandlerRef, pattern: &str) {
        self.handler = Some(handler);
        self.pattern = Some(Arc::from(pattern));
    }

    /// Resolve the next node for one request segment
    ///
    /// Returns the child plus the parameter name to bind, if the child is a
    /// parameter node.
    pub(crate) fn next(
        &self,
        segment: &str,
        policy: ConstraintPolicy,
    ) -> Option<(&RouteNode, Option<&Arc<str>>)> {
        if let Some(child) = self.children.get(segment) {
            return Some((child, None));
        }
        if let Some(child) = self.param_child.as_deref() {
            if let Some(param) = &child.param {
                let satisfied = param
                    .constraint
                    .as_ref()
                    .map_or(true, |re| re.is_match(segment));
                if satisfied || policy == ConstraintPolicy::Permissive {
                    return Some((child, Some(&param.name)));
                }
            }
        }
        self.wildcard_child.as_deref().map(|child| (child, None))
    }

    /// Visit every node carrying a handler, depth first
    pub(crate) fn for_each_route<'a>(&'a self, f: &mut dyn FnMut(&'a Arc<str>)) {
        if let Some(pattern) = &self.pattern {
            f(pattern);
        }
        for child in self.children.values() {
            child.for_each_route(f);
        }
        if let Some(child) = &self.param_child {
            child.for_each_route(f);
        }
        if let Some(child) = &self.wildcard_child {
            child.for_each_route(f);
        }
    }
}

impl std::fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteNode")
            .field("segment", &self.segment)
            .field("kind", &self.kind)
            .field("has_handler", &self.handler.is_some())
            .field("pattern", &self.pattern)
            .finish()
    }
}
