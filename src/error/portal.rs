use thiserror::Error;

/// Shown whenever a call needs a session and there is none (or it expired).
pub const UNAUTHENTICATED_MESSAGE: &str = "Unauthenticated: please sign in again";

/// Fallback when the API fails without a usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{}", UNAUTHENTICATED_MESSAGE)]
    Unauthenticated,

    /// Non-2xx answer from the API. `code` is the envelope `code` when the server sent one.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("session storage: {0}")]
    Io(#[from] std::io::Error),
}

impl PortalError {
    pub fn api(status: u16, code: Option<String>, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        PortalError::Api {
            status,
            code,
            message,
        }
    }

    /// HTTP status carried by the error, if it came from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            PortalError::Unauthenticated => Some(401),
            PortalError::Api { status, .. } => Some(*status),
            PortalError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T, E = PortalError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_message_falls_back_to_generic() {
        let err = PortalError::api(500, None, Some("  ".into()));
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn api_error_keeps_upstream_code_and_message() {
        let err = PortalError::api(409, Some("COUPON_TAKEN".into()), Some("Code exists".into()));
        match err {
            PortalError::Api { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("COUPON_TAKEN"));
                assert_eq!(message, "Code exists");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unauthenticated_has_fixed_message() {
        assert_eq!(
            PortalError::Unauthenticated.to_string(),
            UNAUTHENTICATED_MESSAGE
        );
    }
}
