//! hitch demo — global middleware, route middleware, a mounted sub-app.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl -i http://localhost:3000/api/echo/hip-hop
//!   curl -i http://localhost:3000/route_middleware
//!   curl -i -X POST http://localhost:3000/

use hitch::middleware::{self, Next};
use hitch::{Hitch, Request, Response, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let api = Hitch::new()
        .get("/api/echo/:phrase", echo)
        .into_handler();

    let app = Hitch::new()
        .middleware(middleware::logger())
        .middleware(middleware::from_fn(plaintext))
        .use_handler(awesome)
        .get("/", home)
        .get_with("/route_middleware", home, [tag("outer"), tag("inner")])
        .fallback(api)
        .into_handler();

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

async fn plaintext(req: Request, next: Next) -> Response {
    let mut res = next.run(req).await;
    res.set_header("content-type", "text/plain");
    res
}

// Runs before every request and always falls through.
async fn awesome(_req: Request) -> Response {
    Response::builder().header("x-awesome", "awesome").no_body()
}

async fn home(_req: Request) -> Response {
    Response::text("Hello, world!")
}

// GET /api/echo/:phrase — served by the mounted sub-app
async fn echo(req: Request) -> String {
    req.params().by_name("phrase").to_owned()
}

// Brackets the body with its name: "outer -> inner -> Hello, world! -> inner -> outer"
fn tag(name: &'static str) -> impl middleware::Middleware {
    middleware::from_fn(move |req: Request, next: Next| async move {
        let mut res = next.run(req).await;
        let body = format!("{name} -> {} -> {name}", String::from_utf8_lossy(res.body()));
        *res.body_mut() = body.into_bytes();
        res
    })
}
