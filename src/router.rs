//! Radix-tree request router.
//!
//! One [`matchit`] tree per HTTP method, O(path-length) lookup. This module
//! owns no matching logic: it translates `:name` / `*name` patterns into
//! matchit's `{name}` / `{*name}` syntax, stores handlers, and reports what
//! matchit found.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::params::Params;

/// The path router a [`Hitch`](crate::Hitch) dispatches into.
///
/// Usually you register routes through `Hitch` and never touch this type.
/// Build one yourself to hand a pre-populated router to
/// [`Hitch::with_router`](crate::Hitch::with_router).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

/// Outcome of a lookup.
pub(crate) enum RouteMatch {
    Found(BoxedHandler, Params),
    /// The path exists, but not under this method. Carries the methods it
    /// does exist under, sorted.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + pattern pair. Returns `self` for chaining.
    ///
    /// Named segments use `:name`, catch-alls `*name` (matchit's `{name}` and
    /// `{*name}` are accepted as-is).
    ///
    /// # Panics
    ///
    /// Panics if the pattern is malformed or conflicts with one already
    /// registered for the same method. Use [`Router::try_on`] to get the
    /// error instead.
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.try_on(method, pattern, handler)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"))
    }

    /// Like [`Router::on`], but returns matchit's verdict instead of panicking.
    pub fn try_on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Result<Self, Error> {
        self.insert(method, pattern, handler.into_boxed_handler())?;
        Ok(self)
    }

    pub(crate) fn insert(
        &mut self,
        method: Method,
        pattern: &str,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        self.routes
            .entry(method)
            .or_default()
            .insert(translate(pattern), handler)?;
        Ok(())
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> RouteMatch {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            return RouteMatch::Found(Arc::clone(matched.value), matched.params.into());
        }

        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(m, tree)| *m != method && tree.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();
        if allowed.is_empty() {
            return RouteMatch::NotFound;
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        RouteMatch::MethodNotAllowed(allowed)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Rewrites `/users/:id/*rest` into matchit's `/users/{id}/{*rest}`.
///
/// Only whole segments starting with `:` or `*` are rewritten, so a literal
/// colon inside a segment (`/v1:batch`) survives.
fn translate(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| match segment.as_bytes().first() {
            Some(b':') if segment.len() > 1 => format!("{{{}}}", &segment[1..]),
            Some(b'*') if segment.len() > 1 => format!("{{*{}}}", &segment[1..]),
            _ => segment.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
