use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ success, message, code, data, errors }` as sent by every endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Envelope {
    /// Absent on some endpoints; the HTTP status decides then.
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default)]
    pub message: Option<String>,

    /// Some endpoints send a number here, others a string.
    #[serde(default)]
    pub code: Option<Value>,

    #[serde(default)]
    pub data: Value,

    #[serde(default)]
    pub errors: Option<RawFieldErrors>,
}

impl Envelope {
    pub fn code_string(&self) -> Option<String> {
        match &self.code {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Validation messages, either one string or a list per field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl FieldMessages {
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldMessages::One(m) => Some(m.as_str()),
            FieldMessages::Many(list) => list.first().map(String::as_str),
        }
    }
}

pub type RawFieldErrors = BTreeMap<String, FieldMessages>;

/// Field name to the single message shown next to it.
pub type FieldErrors = BTreeMap<String, String>;

pub fn first_messages(raw: &RawFieldErrors) -> FieldErrors {
    raw.iter()
        .filter_map(|(field, messages)| {
            messages
                .first()
                .map(|message| (field.clone(), message.to_string()))
        })
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Pagination {
    #[serde(default = "one")]
    pub current_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "one")]
    pub last_page: u32,
}

fn one() -> u32 {
    1
}

impl Pagination {
    /// Used when a list endpoint omits `pagination`.
    pub fn single_page(rows: usize) -> Self {
        Self {
            current_page: 1,
            per_page: rows as u32,
            total: rows as u64,
            last_page: 1,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn summary(&self) -> String {
        format!(
            "Page {} of {} ({} total, {} per page)",
            self.current_page,
            self.last_page.max(1),
            self.total,
            self.per_page
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub pagination: Pagination,
}

/// What an API call produced, once transport failures are out of the way.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success { data: T, message: Option<String> },
    Failure { message: String, errors: FieldErrors },
    NotFound { message: String },
}

impl<T> ApiOutcome<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Success { data, message } => ApiOutcome::Success {
                data: f(data),
                message,
            },
            ApiOutcome::Failure { message, errors } => ApiOutcome::Failure { message, errors },
            ApiOutcome::NotFound { message } => ApiOutcome::NotFound { message },
        }
    }

    pub fn try_map<U, E, F>(self, f: F) -> Result<ApiOutcome<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        Ok(match self {
            ApiOutcome::Success { data, message } => ApiOutcome::Success {
                data: f(data)?,
                message,
            },
            ApiOutcome::Failure { message, errors } => ApiOutcome::Failure { message, errors },
            ApiOutcome::NotFound { message } => ApiOutcome::NotFound { message },
        })
    }

    pub fn success(self) -> Option<T> {
        match self {
            ApiOutcome::Success { data, .. } => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_accept_single_string_or_list() {
        let envelope: Envelope = serde_json::from_str(
            r#"{
                "success": false,
                "message": "The given data was invalid.",
                "code": 422,
                "errors": { "title": ["Title is required", "Title is too short"], "slug": "Slug taken" }
            }"#,
        )
        .unwrap();
        let errors = first_messages(envelope.errors.as_ref().unwrap());
        assert_eq!(errors.get("title").unwrap(), "Title is required");
        assert_eq!(errors.get("slug").unwrap(), "Slug taken");
        assert_eq!(envelope.code_string().as_deref(), Some("422"));
    }

    #[test]
    fn empty_message_list_yields_no_field_error() {
        let mut raw = RawFieldErrors::new();
        raw.insert("title".into(), FieldMessages::Many(vec![]));
        assert!(first_messages(&raw).is_empty());
    }

    #[test]
    fn pagination_defaults_and_navigation() {
        let pagination: Pagination =
            serde_json::from_str(r#"{"current_page": 2, "per_page": 10, "total": 35, "last_page": 4}"#)
                .unwrap();
        assert!(pagination.has_next());
        assert!(pagination.has_previous());
        assert_eq!(pagination.summary(), "Page 2 of 4 (35 total, 10 per page)");

        let sparse: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(sparse.current_page, 1);
        assert!(!sparse.has_next());
    }
}
