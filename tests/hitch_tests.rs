use std::sync::{Arc, Mutex};

use bytes::Bytes;
use hitch::middleware::{self, Middleware, Next};
use hitch::{Hitch, Method, Request, Response, StatusCode};

// ── helpers ──────────────────────────────────────────────────────────────────

fn request(method: Method, path: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
        .into()
}

async fn send(app: &Next, method: Method, path: &str) -> Response {
    app.run(request(method, path)).await
}

fn body(res: &Response) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

type Journal = Arc<Mutex<Vec<String>>>;

/// Records `name:in` before delegating and `name:out` after.
fn recorder(name: &'static str, journal: &Journal) -> impl Middleware {
    let journal = Arc::clone(journal);
    middleware::from_fn(move |req: Request, next: Next| {
        let journal = Arc::clone(&journal);
        async move {
            journal.lock().unwrap().push(format!("{name}:in"));
            let res = next.run(req).await;
            journal.lock().unwrap().push(format!("{name}:out"));
            res
        }
    })
}

/// Writes `name -> ` before and ` -> name` after the downstream body.
fn bracket(name: &'static str) -> impl Middleware {
    middleware::from_fn(move |req: Request, next: Next| async move {
        let mut res = next.run(req).await;
        let inner = String::from_utf8_lossy(res.body()).into_owned();
        *res.body_mut() = format!("{name} -> {inner} -> {name}").into_bytes();
        res
    })
}

async fn plaintext(req: Request, next: Next) -> Response {
    let mut res = next.run(req).await;
    res.set_header("content-type", "text/plain");
    res
}

async fn awesome(_req: Request) -> Response {
    Response::builder().header("x-awesome", "awesome").no_body()
}

async fn home(_req: Request) -> Response {
    Response::text("Hello, world!")
}

async fn unreachable_handler(_req: Request) -> Response {
    panic!("handler must not run")
}

async fn echo(req: Request) -> String {
    req.params().by_name("phrase").to_owned()
}

/// The same wiring the demo uses: global middleware, a fall-through handler,
/// a route with its own middleware, and a sub-app mounted as the fallback.
fn app() -> Next {
    let api = Hitch::new()
        .get("/api/echo/:phrase", echo)
        .into_handler();

    Hitch::new()
        .middleware(middleware::logger())
        .middleware(middleware::from_fn(plaintext))
        .use_handler(awesome)
        .get("/", home)
        .get_with("/route_middleware", home, [bracket("middleware1"), bracket("middleware2")])
        .fallback(api)
        .into_handler()
}

fn expect_headers(res: &Response) {
    assert_eq!(res.header("Content-Type"), Some("text/plain"));
    assert_eq!(res.header("X-Awesome"), Some("awesome"));
}

// ── scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn home_passes_through_logger_and_plaintext() {
    let res = send(&app(), Method::GET, "/").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    expect_headers(&res);
    assert_eq!(body(&res), "Hello, world!");
}

#[tokio::test]
async fn echo_reads_param_through_mounted_fallback() {
    let res = send(&app(), Method::GET, "/api/echo/hip-hop").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    expect_headers(&res);
    assert_eq!(body(&res), "hip-hop");
}

#[tokio::test]
async fn route_middleware_runs_in_listed_order() {
    let res = send(&app(), Method::GET, "/route_middleware").await;
    expect_headers(&res);
    assert_eq!(
        body(&res),
        "middleware1 -> middleware2 -> Hello, world! -> middleware2 -> middleware1",
    );
}

// ── ordering ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn global_middleware_in_registration_order_out_in_reverse() {
    let journal = Journal::default();
    let handler_journal = Arc::clone(&journal);
    let app = Hitch::new()
        .middleware(recorder("m0", &journal))
        .middleware(recorder("m1", &journal))
        .middlewares([recorder("m2", &journal), recorder("m3", &journal)])
        .get("/", move |_req: Request| {
            let journal = Arc::clone(&handler_journal);
            async move {
                journal.lock().unwrap().push("handler".to_owned());
                "done"
            }
        })
        .into_handler();

    let res = send(&app, Method::GET, "/").await;
    assert_eq!(body(&res), "done");
    assert_eq!(
        *journal.lock().unwrap(),
        ["m0:in", "m1:in", "m2:in", "m3:in", "handler", "m3:out", "m2:out", "m1:out", "m0:out"],
    );
}

#[tokio::test]
async fn global_middleware_wraps_route_middleware() {
    let journal = Journal::default();
    let app = Hitch::new()
        .middleware(recorder("global", &journal))
        .get_with("/", home, [recorder("a", &journal), recorder("b", &journal)])
        .into_handler();

    send(&app, Method::GET, "/").await;
    assert_eq!(
        *journal.lock().unwrap(),
        ["global:in", "a:in", "b:in", "b:out", "a:out", "global:out"],
    );
}

#[tokio::test]
async fn global_middleware_also_wraps_misses() {
    let journal = Journal::default();
    let app = Hitch::new()
        .middleware(recorder("global", &journal))
        .into_handler();

    let res = send(&app, Method::GET, "/nowhere").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(*journal.lock().unwrap(), ["global:in", "global:out"]);
}

#[tokio::test]
async fn raw_decorators_compose_like_from_fn() {
    let outer = middleware::wrap_fn(|next: Next| {
        Next::new(move |mut req: Request| {
            req.headers_mut().insert("x-seen", "outer".parse().unwrap());
            next.run(req)
        })
    });
    let app = Hitch::new()
        .middleware(outer)
        .get("/", |req: Request| async move {
            req.header("x-seen").unwrap_or("nobody").to_owned()
        })
        .into_handler();

    assert_eq!(body(&send(&app, Method::GET, "/").await), "outer");
}

#[tokio::test]
async fn middleware_can_short_circuit() {
    let deny = middleware::from_fn(|_req: Request, _next: Next| async { StatusCode::FORBIDDEN });
    let app = Hitch::new()
        .middleware(deny)
        .get("/", unreachable_handler)
        .into_handler();

    let res = send(&app, Method::GET, "/").await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn use_handler_always_falls_through() {
    let app = Hitch::new()
        .use_handler(awesome)
        .use_handler(|_req: Request| async { "note: " })
        .get("/", home)
        .into_handler();

    let res = send(&app, Method::GET, "/").await;
    assert_eq!(res.header("x-awesome"), Some("awesome"));
    assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(body(&res), "note: Hello, world!");
}

// ── params ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn params_are_empty_on_unparameterized_routes() {
    let app = Hitch::new()
        .get("/", |req: Request| async move {
            format!("{}:{}", req.params().len(), req.params().by_name("phrase"))
        })
        .into_handler();

    assert_eq!(body(&send(&app, Method::GET, "/").await), "0:");
}

#[test]
fn params_are_empty_before_dispatch() {
    let req = request(Method::GET, "/api/echo/hip-hop");
    assert!(req.params().is_empty());
    assert_eq!(req.param("phrase"), None);
}

#[tokio::test]
async fn params_from_several_segments_and_catch_all() {
    let app = Hitch::new()
        .get("/users/:id/files/*path", |req: Request| async move {
            format!("{}|{}", req.param("id").unwrap_or("?"), req.param("path").unwrap_or("?"))
        })
        .into_handler();

    let res = send(&app, Method::GET, "/users/7/files/a/b.txt").await;
    assert_eq!(body(&res), "7|a/b.txt");
}

#[tokio::test]
async fn params_are_percent_decoded() {
    let app = Hitch::new()
        .get("/api/echo/:phrase", echo)
        .into_handler();

    let res = send(&app, Method::GET, "/api/echo/hip%20hop").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body(&res), "hip hop");
}

#[tokio::test]
async fn params_do_not_leak_between_requests() {
    let app = Hitch::new()
        .get("/api/echo/:phrase", echo)
        .into_handler();

    assert_eq!(body(&send(&app, Method::GET, "/api/echo/one").await), "one");
    assert_eq!(body(&send(&app, Method::GET, "/api/echo/two").await), "two");
}

#[tokio::test]
async fn middleware_sees_no_params_before_the_router() {
    let seen = Arc::new(Mutex::new(None));
    let probe = {
        let seen = Arc::clone(&seen);
        middleware::from_fn(move |req: Request, next: Next| {
            *seen.lock().unwrap() = Some(req.params().len());
            next.run(req)
        })
    };
    let app = Hitch::new()
        .middleware(probe)
        .get("/api/echo/:phrase", echo)
        .into_handler();

    assert_eq!(body(&send(&app, Method::GET, "/api/echo/x").await), "x");
    assert_eq!(*seen.lock().unwrap(), Some(0));
}

// ── misses ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn no_routes_and_no_fallback_is_404() {
    let app = Hitch::new().into_handler();
    let res = send(&app, Method::GET, "/").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert!(res.body().is_empty());
}

#[tokio::test]
async fn unregistered_path_goes_to_fallback() {
    let app = Hitch::new()
        .get("/", home)
        .fallback(|req: Request| async move {
            (StatusCode::NOT_FOUND, format!("no such page: {}", req.path()))
        })
        .into_handler();

    let res = send(&app, Method::GET, "/missing").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(body(&res), "no such page: /missing");
}

#[tokio::test]
async fn wrong_method_is_405_with_allow() {
    let app = Hitch::new()
        .put("/items/:id", home)
        .delete("/items/:id", home)
        .fallback(|_req: Request| async { "fallback" })
        .into_handler();

    let res = send(&app, Method::GET, "/items/1").await;
    assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.header("allow"), Some("DELETE, PUT"));
}

#[tokio::test]
async fn method_sugar_registers_each_verb() {
    let app = Hitch::new()
        .get("/v", |_req: Request| async { "get" })
        .put("/v", |_req: Request| async { "put" })
        .post("/v", |_req: Request| async { "post" })
        .patch("/v", |_req: Request| async { "patch" })
        .delete("/v", |_req: Request| async { "delete" })
        .options("/v", |_req: Request| async { "options" })
        .head("/v", |_req: Request| async { "head" })
        .handle(Method::TRACE, "/v", |_req: Request| async { "trace" })
        .into_handler();

    for (method, expected) in [
        (Method::GET, "get"),
        (Method::PUT, "put"),
        (Method::POST, "post"),
        (Method::PATCH, "patch"),
        (Method::DELETE, "delete"),
        (Method::OPTIONS, "options"),
        (Method::HEAD, "head"),
        (Method::TRACE, "trace"),
    ] {
        assert_eq!(body(&send(&app, method, "/v").await), expected);
    }
}

#[test]
#[should_panic(expected = "invalid route `/`")]
fn duplicate_route_panics() {
    let _ = Hitch::new().get("/", home).get("/", home);
}

#[tokio::test]
async fn prebuilt_router_is_reused() {
    let router = hitch::Router::new().on(Method::GET, "/api/echo/:phrase", echo);
    let app = Hitch::with_router(router)
        .middleware(middleware::from_fn(plaintext))
        .into_handler();

    let res = send(&app, Method::GET, "/api/echo/hi").await;
    assert_eq!(res.header("content-type"), Some("text/plain"));
    assert_eq!(body(&res), "hi");
}
