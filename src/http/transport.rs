use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::Value;
use url::Url;

use crate::config::AppConfig;
use crate::core::schema::FileUpload;
use crate::error::Result;
use crate::http::auth_middleware::{AuthHeaderMiddleware, PublicRequest, TokenFn};
use crate::http::logging_middleware::LoggingMiddleware;

#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, upload: FileUpload },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<MultipartField>),
}

/// A call against the remote API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Sent without the session's bearer token.
    pub public: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            public: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Stable key for the response cache.
    pub fn cache_key(&self) -> String {
        let mut query = self.query.clone();
        query.sort();
        let query = query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let scope = if self.public { "public" } else { "auth" };
        format!("{} {} {}?{}", scope, self.method, self.path, query)
    }
}

/// Status and parsed body, before any envelope interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse>;
}

pub struct ApiClient {
    client: ClientWithMiddleware,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &AppConfig, token_fn: TokenFn) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let client = ClientBuilder::new(client)
            .with(LoggingMiddleware)
            .with(AuthHeaderMiddleware {
                token_fn: Arc::clone(&token_fn),
            })
            .build();

        Ok(ApiClient {
            client,
            base_url: config.api_base_url.clone(),
        })
    }
}

#[async_trait]
impl ApiTransport for ApiClient {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = self.base_url.join(request.path.trim_start_matches('/'))?;
        let mut builder = self.client.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if request.public {
            builder = builder.with_extension(PublicRequest);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(json) => builder.json(&json),
            RequestBody::Multipart(fields) => builder.multipart(multipart_form(fields)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!("non-JSON body from API (status {status}): {err}");
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok(RawResponse { status, body })
    }
}

fn multipart_form(fields: Vec<MultipartField>) -> Result<Form> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            MultipartField::Text { name, value } => form.text(name, value),
            MultipartField::File { name, upload } => {
                let part = Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(&upload.mime)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}
