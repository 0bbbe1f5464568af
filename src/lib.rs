//! # hitch
//!
//! Ties a radix-tree router, request-scoped path params, and a middleware
//! chain up in a bow.
//!
//! ## What it does
//!
//! - **Routing** is [`matchit`]'s job. hitch registers `:name` patterns with
//!   it and asks it for matches. Nothing more.
//! - **Middleware** is an ordered list of decorators folded around the
//!   router. First registered runs first, on the way in, and last, on the
//!   way out. Route-scoped middleware follows the same rule, inside the
//!   global chain.
//! - **Path params** ride along in the request's extensions. Any handler can
//!   read them with [`Request::params`]; nothing has to pass them along.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hitch::{Hitch, Request, Response, Server, middleware};
//! use hitch::middleware::Next;
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Hitch::new()
//!         .middleware(middleware::logger())
//!         .middleware(middleware::from_fn(plaintext))
//!         .get("/", home)
//!         .get("/api/echo/:phrase", echo)
//!         .into_handler();
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn plaintext(req: Request, next: Next) -> Response {
//!     let mut res = next.run(req).await;
//!     res.set_header("content-type", "text/plain");
//!     res
//! }
//!
//! async fn home(_req: Request) -> Response {
//!     Response::text("Hello, world!")
//! }
//!
//! async fn echo(req: Request) -> String {
//!     req.params().by_name("phrase").to_owned()
//! }
//! ```

mod error;
mod handler;
mod hitch;
mod params;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, Handler, Next};
pub use hitch::Hitch;
pub use params::Params;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

pub use http::{Method, StatusCode};
