mod common;

use bytes::Bytes;
use common::Captured;
use hitch::{Hitch, Method, Request, StatusCode, middleware};

async fn echo(req: Request) -> String {
    req.params().by_name("phrase").to_owned()
}

fn request(method: Method, path: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
        .into()
}

#[tokio::test]
async fn logs_started_then_completed_with_fields() {
    let logs = Captured::default();
    let _guard = logs.install();

    let app = Hitch::new()
        .middleware(middleware::logger())
        .get("/api/echo/:phrase", echo)
        .into_handler();

    let res = app.run(request(Method::GET, "/api/echo/x")).await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let text = logs.text();
    let started = text.find("started").expect(&text);
    let completed = text.find("completed").expect(&text);
    assert!(started < completed, "{text}");

    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2, "{text}");
    for line in &lines {
        assert!(line.contains("INFO"), "{line}");
        assert!(line.contains("method=GET"), "{line}");
        assert!(line.contains("path=/api/echo/x"), "{line}");
    }
    assert!(lines[1].contains("status=200"), "{text}");
    assert!(lines[1].contains("elapsed="), "{text}");
}

#[tokio::test]
async fn logs_status_of_misses() {
    let logs = Captured::default();
    let _guard = logs.install();

    let app = Hitch::new()
        .middleware(middleware::logger())
        .into_handler();

    let res = app.run(request(Method::POST, "/nowhere")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    let text = logs.text();
    let completed = text.lines().find(|l| l.contains("completed")).expect(&text);
    assert!(completed.contains("method=POST"), "{completed}");
    assert!(completed.contains("status=404"), "{completed}");
}
