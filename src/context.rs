//! Per-request context
//!
//! A [`Context`] carries the inbound request data and the response state
//! that handlers and middleware fill in. The dispatcher writes the bound path
//! parameters and the matched route pattern onto it; the finalizer reads the
//! response fields back when flushing. No routing logic lives here.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use http::{HeaderMap, Method, Request, StatusCode};

use crate::ids::RequestId;
use crate::router::ParamVec;

/// Header used to propagate request ids between services
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Error returned when reading a path or query value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// No path parameter with this name was bound
    MissingPathParam(String),
    /// The query string has no parameter with this name
    MissingQueryParam(String),
    /// The value is not a valid 64-bit integer
    NotAnInteger {
        /// The raw value
        value: String,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::MissingPathParam(key) => write!(f, "path param '{key}' does not exist"),
            ValueError::MissingQueryParam(key) => write!(f, "query param '{key}' does not exist"),
            ValueError::NotAnInteger { value } => write!(f, "'{value}' is not an integer"),
        }
    }
}

impl std::error::Error for ValueError {}

/// A request value that may be missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    val: Result<String, ValueError>,
}

impl StringValue {
    pub fn as_str(&self) -> Result<&str, ValueError> {
        self.val.as_deref().map_err(Clone::clone)
    }

    pub fn as_i64(&self) -> Result<i64, ValueError> {
        let val = self.as_str()?;
        val.parse().map_err(|_| ValueError::NotAnInteger {
            value: val.to_string(),
        })
    }

    pub fn into_result(self) -> Result<String, ValueError> {
        self.val
    }
}

/// Request data and response state for one request
///
/// Created fresh for every request and dropped once the response is flushed.
#[derive(Debug, Clone)]
pub struct Context {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Raw query string, if any
    pub query: Option<String>,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Vec<u8>,
    /// Path parameters bound by the dispatcher
    pub path_params: ParamVec,
    /// Response status; `None` leaves the choice to the transport
    pub resp_status: Option<StatusCode>,
    /// Response body
    pub resp_body: Vec<u8>,
    matched_route: Option<Arc<str>>,
}

impl Context {
    /// Create a context for a bodiless request, mostly useful in tests
    pub fn new(method: Method, path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path.to_string(), None),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Vec::new(),
            path_params: ParamVec::new(),
            resp_status: None,
            resp_body: Vec::new(),
            matched_route: None,
        }
    }

    /// Build a context from an `http::Request`
    ///
    /// The request id is taken from the `x-request-id` header when it holds a
    /// valid id, otherwise a new one is generated.
    pub fn from_request(req: Request<Vec<u8>>) -> Self {
        let (parts, body) = req.into_parts();
        let request_id = RequestId::from_header_or_new(
            parts
                .headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );
        Self {
            request_id,
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
            path_params: ParamVec::new(),
            resp_status: None,
            resp_body: Vec::new(),
            matched_route: None,
        }
    }

    /// Reader over the request body
    pub fn body_reader(&self) -> impl Read + '_ {
        self.body.as_slice()
    }

    /// Get a header by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Value of the `Host` header
    pub fn host(&self) -> Option<&str> {
        self.header(http::header::HOST.as_str())
    }

    /// Get a bound path parameter by name
    #[inline]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn path_value(&self, key: &str) -> StringValue {
        StringValue {
            val: self
                .get_path_param(key)
                .map(str::to_string)
                .ok_or_else(|| ValueError::MissingPathParam(key.to_string())),
        }
    }

    /// First value of a query parameter, percent-decoded
    pub fn query_value(&self, key: &str) -> StringValue {
        let found = self.query.as_deref().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        });
        StringValue {
            val: found.ok_or_else(|| ValueError::MissingQueryParam(key.to_string())),
        }
    }

    /// Registration pattern of the matched route, e.g. `/users/:id`
    ///
    /// `None` until the dispatcher matched a route with a handler.
    pub fn matched_route(&self) -> Option<&str> {
        self.matched_route.as_deref()
    }

    pub fn set_matched_route(&mut self, pattern: Arc<str>) {
        self.matched_route = Some(pattern);
    }

    /// Set response status and body in one go
    pub fn respond(&mut self, status: StatusCode, body: impl Into<Vec<u8>>) {
        self.resp_status = Some(status);
        self.resp_body = body.into();
    }
}
