use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use serde_json::{Map, Value, json};

use crate::core::portal::Portal;
use crate::core::resource::Resource;
use crate::core::schema::{FieldValue, FormSchema};
use crate::http::transport::{MultipartField, RequestBody};
use crate::model::envelope::{ApiOutcome, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<R> {
    Saved {
        record: Option<R>,
        message: Option<String>,
    },
    /// Field errors are on the form; nothing else to show.
    Invalid,
    /// A single top-level message (toast).
    Rejected { message: String },
    /// A submission was already in flight.
    Busy,
}

#[derive(Debug, Default)]
struct FormState {
    values: BTreeMap<String, FieldValue>,
    field_errors: FieldErrors,
    top_error: Option<String>,
}

struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Form bound to the create/update endpoints of `R`.
pub struct FormSubmitter<R> {
    schema: FormSchema,
    state: Mutex<FormState>,
    pending: AtomicBool,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Default for FormSubmitter<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> FormSubmitter<R> {
    pub fn new() -> Self {
        Self::with_schema(R::form_schema())
    }

    pub fn with_schema(schema: FormSchema) -> Self {
        Self {
            schema,
            state: Mutex::new(FormState::default()),
            pending: AtomicBool::new(false),
            _resource: PhantomData,
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Editing a field clears its error.
    pub fn set(&self, field: &str, value: FieldValue) {
        if self.schema.field(field).is_none() {
            warn!("{field} is not part of the {} form", R::LABEL);
        }
        let mut state = self.state();
        state.field_errors.remove(field);
        state.values.insert(field.to_string(), value);
    }

    pub fn set_text(&self, field: &str, value: impl Into<String>) {
        self.set(field, FieldValue::Text(value.into()));
    }

    pub fn value(&self, field: &str) -> Option<FieldValue> {
        self.state().values.get(field).cloned()
    }

    pub fn field_error(&self, field: &str) -> Option<String> {
        self.state().field_errors.get(field).cloned()
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.state().field_errors.clone()
    }

    pub fn top_error(&self) -> Option<String> {
        self.state().top_error.clone()
    }

    /// The submit control is disabled while this is true.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        *self.state() = FormState::default();
    }

    pub async fn submit(&self, portal: &Portal, mode: FormMode) -> SubmitOutcome<R> {
        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SubmitOutcome::Busy;
        }
        let _guard = PendingGuard(&self.pending);

        let body = {
            let mut state = self.state();
            state.top_error = None;
            let errors = self.schema.validate(|name| state.values.get(name));
            if !errors.is_empty() {
                state.field_errors = errors;
                return SubmitOutcome::Invalid;
            }
            state.field_errors.clear();
            build_body(&state.values)
        };

        let result = match mode {
            FormMode::Create => portal.create::<R>(body).await,
            FormMode::Update(id) => portal.update::<R>(id, body).await,
        };

        let mut state = self.state();
        match result {
            Ok(ApiOutcome::Success { data, message }) => {
                info!("{} saved", R::LABEL);
                *state = FormState::default();
                SubmitOutcome::Saved {
                    record: data,
                    message,
                }
            }
            Ok(ApiOutcome::Failure { message, errors }) if !errors.is_empty() => {
                state.field_errors = errors;
                warn!("{} rejected: {message}", R::LABEL);
                SubmitOutcome::Invalid
            }
            Ok(ApiOutcome::Failure { message, .. } | ApiOutcome::NotFound { message }) => {
                state.top_error = Some(message.clone());
                SubmitOutcome::Rejected { message }
            }
            Err(err) => {
                let message = err.to_string();
                state.top_error = Some(message.clone());
                SubmitOutcome::Rejected { message }
            }
        }
    }
}

/// JSON unless a file is attached, then multipart.
pub fn build_body(values: &BTreeMap<String, FieldValue>) -> RequestBody {
    let has_file = values
        .values()
        .any(|v| matches!(v, FieldValue::File(file) if !file.bytes.is_empty()));

    if !has_file {
        let map: Map<String, Value> = values
            .iter()
            .map(|(name, value)| (name.clone(), json_value(value)))
            .collect();
        return RequestBody::Json(Value::Object(map));
    }

    let mut fields = Vec::new();
    for (name, value) in values {
        match value {
            FieldValue::File(upload) if upload.bytes.is_empty() => {}
            FieldValue::File(upload) => fields.push(MultipartField::File {
                name: name.clone(),
                upload: upload.clone(),
            }),
            FieldValue::List(items) => {
                fields.extend(items.iter().map(|item| MultipartField::Text {
                    name: format!("{name}[]"),
                    value: item.clone(),
                }));
            }
            FieldValue::Bool(flag) => fields.push(MultipartField::Text {
                name: name.clone(),
                value: if *flag { "1" } else { "0" }.to_string(),
            }),
            FieldValue::Number(n) => fields.push(MultipartField::Text {
                name: name.clone(),
                value: n.to_string(),
            }),
            FieldValue::Text(text) => fields.push(MultipartField::Text {
                name: name.clone(),
                value: text.clone(),
            }),
        }
    }
    RequestBody::Multipart(fields)
}

fn json_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(text) if text.is_empty() => Value::Null,
        FieldValue::Text(text) => Value::String(text.clone()),
        FieldValue::Number(n) => json!(n),
        FieldValue::Bool(flag) => Value::Bool(*flag),
        FieldValue::List(items) => json!(items),
        FieldValue::File(_) => Value::Null,
    }
}
