use std::sync::Arc;

use http::Extensions;
use reqwest::header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Returns the current session token, if any.
pub type TokenFn = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Request extension marking a call that must go out without credentials.
#[derive(Debug, Clone, Copy)]
pub struct PublicRequest;

pub struct AuthHeaderMiddleware {
    pub token_fn: TokenFn,
}

pub fn bearer_value(token: &str) -> std::result::Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait::async_trait]
impl Middleware for AuthHeaderMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        if extensions.get::<PublicRequest>().is_none() {
            if let Some(token) = (self.token_fn)() {
                let value = bearer_value(&token).map_err(|err| {
                    reqwest_middleware::Error::Middleware(anyhow::anyhow!(
                        "session token is not a valid header value: {err}"
                    ))
                })?;
                req.headers_mut().insert(AUTHORIZATION, value);
            }
        }
        next.run(req, extensions).await
    }
}
