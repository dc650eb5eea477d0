use http::Method;
use std::fmt;

/// Route registration error
///
/// Returned by [`Router::register`](super::Router::register) when a path is
/// malformed or collides with a route that is already in the table. These
/// errors belong to the setup phase: a service must refuse to start rather
/// than serve a partial routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The path is the empty string
    EmptyPath,
    /// The path does not start with `/`
    MissingLeadingSlash {
        /// The offending path
        path: String,
    },
    /// The path ends with `/` (only the root path `/` may)
    TrailingSlash {
        /// The offending path
        path: String,
    },
    /// The path contains an empty segment, e.g. `/a//b`
    EmptySegment {
        /// The offending path
        path: String,
    },
    /// A `:` segment has no name or an unterminated `(regex)` suffix
    InvalidParameter {
        /// The offending segment
        segment: String,
    },
    /// The `(regex)` constraint of a parameter segment does not compile
    InvalidRegex {
        /// The offending segment
        segment: String,
        /// Error reported by the regex engine
        reason: String,
    },
    /// A wildcard and a parameter segment were registered under the same parent
    WildcardParamConflict {
        /// Full path being registered
        path: String,
        /// Segment that triggered the conflict
        segment: String,
    },
    /// A parameter segment with a different name or constraint already exists
    /// under the same parent
    ParamConflict {
        /// Segment already registered, e.g. `:id`
        existing: String,
        /// Segment being registered, e.g. `:user_id`
        new: String,
    },
    /// A handler is already registered for this method and path
    DuplicateRoute {
        /// HTTP method of the conflicting route
        method: Method,
        /// Registration pattern of the conflicting route
        path: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::EmptyPath => write!(f, "route error: path is empty"),
            RouteError::MissingLeadingSlash { path } => {
                write!(f, "route error: path '{path}' must start with '/'")
            }
            RouteError::TrailingSlash { path } => {
                write!(f, "route error: path '{path}' must not end with '/'")
            }
            RouteError::EmptySegment { path } => write!(
                f,
                "route error: path '{path}' contains an empty segment \
                (routes such as //a/b or /a//b are not allowed)"
            ),
            RouteError::InvalidParameter { segment } => write!(
                f,
                "route error: invalid parameter segment '{segment}'. \
                Expected :name or :name(regex)"
            ),
            RouteError::InvalidRegex { segment, reason } => write!(
                f,
                "route error: parameter segment '{segment}' has an invalid regex: {reason}"
            ),
            RouteError::WildcardParamConflict { path, segment } => write!(
                f,
                "route error: '{segment}' in '{path}' conflicts with a sibling. \
                Wildcard and parameter routes cannot share a parent"
            ),
            RouteError::ParamConflict { existing, new } => write!(
                f,
                "route error: parameter route conflict, '{existing}' is already \
                registered, cannot register '{new}'"
            ),
            RouteError::DuplicateRoute { method, path } => {
                write!(f, "route error: route conflict, {method} {path} is already registered")
            }
        }
    }
}

impl std::error::Error for RouteError {}
