pub mod auth_middleware;
pub mod cache;
pub mod logging_middleware;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use transport::{ApiClient, ApiRequest, ApiTransport, MultipartField, RawResponse, RequestBody};
