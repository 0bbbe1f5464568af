//! The registration API and the composed pipeline.
//!
//! A [`Hitch`] collects global middleware, routes, and a fallback. Calling
//! [`Hitch::into_handler`] freezes all of it into one [`Next`]:
//!
//! ```text
//! m0 ─▶ m1 ─▶ … ─▶ mN-1 ─▶ router ─┬─▶ r0 ─▶ r1 ─▶ handler   (route matched)
//!                                   ├─▶ 405 + Allow          (other method)
//!                                   └─▶ fallback | 404       (no route)
//! ```
//!
//! `m*` are global middleware in registration order, `r*` a route's own
//! middleware in listed order. First registered = outermost = runs first.

use std::sync::Arc;

use http::header::{ALLOW, HeaderValue};
use http::{Method, StatusCode};
use tracing::trace;

use crate::handler::{Handler, Next};
use crate::middleware::{self, FallThrough, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::router::{RouteMatch, Router};

/// Router + middleware chain + fallback, built once at startup.
///
/// ```rust
/// use hitch::{Hitch, Request, Response, middleware};
///
/// async fn home(_: Request) -> Response { Response::text("Hello, world!") }
/// async fn echo(req: Request) -> String { req.params().by_name("phrase").to_owned() }
///
/// let app = Hitch::new()
///     .middleware(middleware::logger())
///     .get("/", home)
///     .get("/api/echo/:phrase", echo)
///     .into_handler();
/// ```
pub struct Hitch {
    router: Router,
    middleware: Vec<Arc<dyn Middleware>>,
    fallback: Option<Next>,
}

impl Hitch {
    pub fn new() -> Self {
        Self::with_router(Router::new())
    }

    /// Starts from a router that already has routes on it.
    pub fn with_router(router: Router) -> Self {
        Self { router, middleware: Vec::new(), fallback: None }
    }

    /// Appends one global middleware. Runs after everything installed before it.
    pub fn middleware(mut self, m: impl Middleware) -> Self {
        self.middleware.push(Arc::new(m));
        self
    }

    /// Appends several global middleware, in iteration order.
    ///
    /// Calling this twice is the same as calling it once with both lists
    /// concatenated.
    pub fn middlewares<I, M>(mut self, ms: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Middleware,
    {
        self.middleware.extend(ms.into_iter().map(|m| Arc::new(m) as Arc<dyn Middleware>));
        self
    }

    /// Installs a plain handler as middleware that always falls through.
    ///
    /// `handler` runs first on a copy of the request; the rest of the chain
    /// then runs regardless. Headers `handler` sets end up on the final
    /// response unless something downstream sets the same header.
    pub fn use_handler(self, handler: impl Handler) -> Self {
        self.middleware(FallThrough::new(handler))
    }

    /// Registers `handler` for `method` + `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or already registered for `method`.
    pub fn handle(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.register(method, path, Next::new(handler))
    }

    /// Registers `handler` wrapped in route-scoped middleware.
    ///
    /// The first listed middleware runs first, exactly like global
    /// middleware. All of them sit inside the global chain.
    ///
    /// # Panics
    ///
    /// Same as [`Hitch::handle`].
    pub fn handle_with<I, M>(
        self,
        method: Method,
        path: &str,
        handler: impl Handler,
        route_middleware: I,
    ) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Middleware,
    {
        let stack: Vec<Arc<M>> = route_middleware.into_iter().map(Arc::new).collect();
        let stage = middleware::compose(&stack, Next::new(handler));
        self.register(method, path, stage)
    }

    fn register(mut self, method: Method, path: &str, stage: Next) -> Self {
        if let Err(e) = self.router.insert(method, path, stage.into_boxed_handler()) {
            panic!("invalid route `{path}`: {e}");
        }
        self
    }

    /// Handler for requests no route matches. Replaces the built-in 404.
    ///
    /// Another instance's [`into_handler`](Hitch::into_handler) works here,
    /// which is how to mount one `Hitch` behind another.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(Next::new(handler));
        self
    }

    /// Freezes the instance into the composed pipeline.
    pub fn into_handler(self) -> Next {
        let terminal = dispatch(self.router, self.fallback);
        middleware::compose(&self.middleware, terminal)
    }
}

impl Default for Hitch {
    fn default() -> Self { Self::new() }
}

// ── Method sugar ──────────────────────────────────────────────────────────────

macro_rules! method_sugar {
    ($($name:ident, $name_with:ident => $method:ident;)*) => {
        impl Hitch {
            $(
                #[doc = concat!("Registers a `", stringify!($method), "` handler. See [`Hitch::handle`].")]
                pub fn $name(self, path: &str, handler: impl Handler) -> Self {
                    self.handle(Method::$method, path, handler)
                }

                #[doc = concat!("Registers a `", stringify!($method), "` handler behind route middleware. See [`Hitch::handle_with`].")]
                pub fn $name_with<I, M>(self, path: &str, handler: impl Handler, route_middleware: I) -> Self
                where
                    I: IntoIterator<Item = M>,
                    M: Middleware,
                {
                    self.handle_with(Method::$method, path, handler, route_middleware)
                }
            )*
        }
    };
}

method_sugar! {
    get,     get_with     => GET;
    put,     put_with     => PUT;
    post,    post_with    => POST;
    patch,   patch_with   => PATCH;
    delete,  delete_with  => DELETE;
    options, options_with => OPTIONS;
    head,    head_with    => HEAD;
}

// ── Terminal stage ────────────────────────────────────────────────────────────

/// The innermost stage: route the request, attach its params, run the match.
fn dispatch(router: Router, fallback: Option<Next>) -> Next {
    let router = Arc::new(router);
    Next::new(move |mut req: Request| {
        let stage = match router.lookup(req.method(), req.path()) {
            RouteMatch::Found(handler, params) => {
                req.attach_params(params);
                Ok(Next::from_boxed(handler))
            }
            RouteMatch::MethodNotAllowed(allowed) => {
                trace!(method = %req.method(), path = req.path(), "method not allowed");
                Err(method_not_allowed(&allowed))
            }
            RouteMatch::NotFound => {
                trace!(method = %req.method(), path = req.path(), "no route, falling back");
                fallback.clone().ok_or_else(|| Response::status(StatusCode::NOT_FOUND))
            }
        };
        async move {
            match stage {
                Ok(next) => next.run(req).await,
                Err(res) => res,
            }
        }
    })
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let list = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    let mut res = Response::status(StatusCode::METHOD_NOT_ALLOWED);
    if let Ok(value) = HeaderValue::from_str(&list) {
        res.headers_mut().insert(ALLOW, value);
    }
    res
}
