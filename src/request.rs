//! Incoming HTTP request type.

use bytes::Bytes;
use http::request::Parts;
use http::{Extensions, HeaderMap, Method, Uri};

use crate::params::{self, Attached, Params};

/// An incoming HTTP request with its body fully buffered.
///
/// Cloning is cheap for the body (`Bytes` is reference-counted) and copies
/// the head.
#[derive(Clone, Debug)]
pub struct Request {
    head: Parts,
    body: Bytes,
}

impl Request {
    pub(crate) fn from_parts(head: Parts, body: Bytes) -> Self {
        Self { head, body }
    }

    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.head.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Per-request typed storage. Middleware can stash values here for
    /// handlers further down the chain.
    pub fn extensions(&self) -> &Extensions { &self.head.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.head.extensions }

    /// Case-insensitive header lookup. `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Path parameters the router extracted for this request.
    ///
    /// Empty when the request has not been matched against a parameterized
    /// route (yet). Never panics.
    pub fn params(&self) -> &Params {
        self.head.extensions
            .get::<Attached>()
            .map_or(&params::EMPTY, |a| &a.0)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params().get(name)
    }

    pub(crate) fn attach_params(&mut self, params: Params) {
        self.head.extensions.insert(Attached(params));
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (head, body) = req.into_parts();
        Self { head, body }
    }
}
