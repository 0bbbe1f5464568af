//! Request logger.

use std::time::Instant;

use tracing::info;

use super::{Middleware, Next};
use crate::request::Request;

/// Logs every request on the way in and its response on the way out.
///
/// Emits two `info` events per request, `started` and `completed`, with
/// method, path, status, and elapsed time as fields. Install it first so
/// the elapsed time covers the whole chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logger;

pub fn logger() -> Logger {
    Logger
}

impl Middleware for Logger {
    fn wrap(&self, next: Next) -> Next {
        Next::new(move |req: Request| {
            let next = next.clone();
            async move {
                let start = Instant::now();
                let method = req.method().clone();
                let path = req.path().to_owned();
                info!(%method, %path, "started");

                let res = next.run(req).await;

                let status = res.status_code();
                info!(
                    %method,
                    %path,
                    status = status.as_u16(),
                    reason = status.canonical_reason().unwrap_or(""),
                    elapsed = ?start.elapsed(),
                    "completed"
                );
                res
            }
        })
    }
}
