//! Middleware: decorators around a pipeline stage.
//!
//! A middleware takes "the rest of the pipeline" ([`Next`]) and returns a new
//! stage that wraps it. The new stage may run logic before and after calling
//! `next`, rewrite the request on the way in or the response on the way out,
//! or short-circuit by never calling `next` at all.
//!
//! Two ways to write one:
//!
//! ```rust
//! use hitch::middleware::{self, Next};
//! use hitch::{Request, Response};
//!
//! // the usual way: an async fn of (request, next)
//! async fn plaintext(req: Request, next: Next) -> Response {
//!     let mut res = next.run(req).await;
//!     res.set_header("content-type", "text/plain");
//!     res
//! }
//! let a = middleware::from_fn(plaintext);
//!
//! // the raw decorator shape: Next in, Next out
//! let b = middleware::wrap_fn(|next: Next| next);
//! ```
//!
//! Built-ins:
//! - [`logger`] — `started` / `completed` events through `tracing`

mod logger;

use std::future::Future;
use std::sync::Arc;

pub use crate::handler::Next;
pub use logger::{Logger, logger};

use crate::handler::Handler;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A decorator around a pipeline stage.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: Next) -> Next;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn wrap(&self, next: Next) -> Next {
        (**self).wrap(next)
    }
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    fn wrap(&self, next: Next) -> Next {
        (**self).wrap(next)
    }
}

/// Folds `stack` around `terminal`, first entry outermost.
///
/// `[m0, m1, m2]` around `T` gives `m0(m1(m2(T)))`: `m0` sees the request
/// first and the response last.
pub(crate) fn compose<M: Middleware + ?Sized>(
    stack: &[Arc<M>],
    terminal: Next,
) -> Next {
    stack.iter().rev().fold(terminal, |next, m| m.wrap(next))
}

// ── from_fn ───────────────────────────────────────────────────────────────────

/// Middleware from an async function of `(Request, Next)`.
pub fn from_fn<F, Fut, R>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    FromFn(Arc::new(f))
}

/// See [`from_fn`].
pub struct FromFn<F>(Arc<F>);

impl<F, Fut, R> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn wrap(&self, next: Next) -> Next {
        let f = Arc::clone(&self.0);
        Next::new(move |req: Request| {
            let fut = (*f)(req, next.clone());
            async move { fut.await.into_response() }
        })
    }
}

// ── wrap_fn ───────────────────────────────────────────────────────────────────

/// Middleware from a plain decorator `Fn(Next) -> Next`.
pub fn wrap_fn<F>(f: F) -> WrapFn<F>
where
    F: Fn(Next) -> Next + Send + Sync + 'static,
{
    WrapFn(f)
}

/// See [`wrap_fn`].
pub struct WrapFn<F>(F);

impl<F> Middleware for WrapFn<F>
where
    F: Fn(Next) -> Next + Send + Sync + 'static,
{
    fn wrap(&self, next: Next) -> Next {
        (self.0)(next)
    }
}

// ── fall-through handler ──────────────────────────────────────────────────────

/// Runs a plain handler, then always continues down the chain.
///
/// The handler sees a clone of the request. Its response is layered under
/// the downstream one: its headers survive unless downstream sets the same
/// name, and its body goes in front of downstream's. Status is downstream's.
pub(crate) struct FallThrough(Next);

impl FallThrough {
    pub(crate) fn new(handler: impl Handler) -> Self {
        Self(Next::new(handler))
    }
}

impl Middleware for FallThrough {
    fn wrap(&self, next: Next) -> Next {
        let first = self.0.clone();
        Next::new(move |req: Request| {
            let first = first.clone();
            let next = next.clone();
            async move {
                let before = first.run(req.clone()).await;
                let after = next.run(req).await;
                layer_under(before, after)
            }
        })
    }
}

fn layer_under(before: Response, mut after: Response) -> Response {
    let mut current = None;
    for (name, value) in before.headers {
        // HeaderMap's owning iterator yields the name once per run of values.
        if let Some(name) = name {
            current = (!after.headers.contains_key(&name)).then_some(name);
        }
        if let Some(name) = &current {
            after.headers.append(name.clone(), value);
        }
    }
    if !before.body.is_empty() {
        let mut body = before.body;
        body.extend_from_slice(&after.body);
        after.body = body;
    }
    after
}
