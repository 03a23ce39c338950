use std::time::Instant;

use http::Extensions;
use log::{debug, warn};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Logs method, URL, status and elapsed time of every API call.
pub struct LoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        // Query strings can carry search terms; log the path only.
        let path = req.url().path().to_string();
        let started = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed = started.elapsed().as_millis();

        match &result {
            Ok(response) if response.status().is_success() => {
                debug!("{method} {path} -> {} in {elapsed}ms", response.status());
            }
            Ok(response) => {
                warn!("{method} {path} -> {} in {elapsed}ms", response.status());
            }
            Err(err) => {
                warn!("{method} {path} failed after {elapsed}ms: {err}");
            }
        }

        result
    }
}
