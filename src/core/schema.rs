//! Per-entity descriptions of filters and form fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::envelope::FieldErrors;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9\- ]{6,18}[0-9]$").expect("valid phone regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Free text, sent as-is.
    Search,
    /// One value out of a named option list in `OptionLists`, or a remote list.
    Select(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub key: &'static str,
    pub kind: FilterKind,
}

impl FilterField {
    pub const fn search() -> Self {
        Self {
            key: "search",
            kind: FilterKind::Search,
        }
    }

    pub const fn sort_order() -> Self {
        Self {
            key: "sort_order",
            kind: FilterKind::Select("sort_orders"),
        }
    }

    pub const fn select(key: &'static str, options: &'static str) -> Self {
        Self {
            key,
            kind: FilterKind::Select(options),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Phone,
    Number,
    Date,
    Boolean,
    Select,
    MultiSelect,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: Option<usize>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            max_len: None,
        }
    }

    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }
}

/// A value typed into a form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
    File(FileUpload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FieldValue {
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::File(file) => file.bytes.is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormSchema {
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Client-side checks run before anything is sent.
    pub fn validate<'a, F>(&self, value_of: F) -> FieldErrors
    where
        F: Fn(&str) -> Option<&'a FieldValue>,
    {
        let mut errors = FieldErrors::new();
        for spec in &self.fields {
            let value = value_of(spec.name).filter(|v| !v.is_blank());
            let Some(value) = value else {
                if spec.required {
                    errors.insert(spec.name.to_string(), format!("{} is required", spec.label));
                }
                continue;
            };
            if let Some(message) = check_value(spec, value) {
                errors.insert(spec.name.to_string(), message);
            }
        }
        errors
    }
}

fn check_value(spec: &FieldSpec, value: &FieldValue) -> Option<String> {
    let FieldValue::Text(text) = value else {
        return None;
    };
    let text = text.trim();
    if let Some(max) = spec.max_len {
        if text.chars().count() > max {
            return Some(format!("{} may not exceed {max} characters", spec.label));
        }
    }
    match spec.kind {
        FieldKind::Email if !EMAIL_RE.is_match(text) => {
            Some(format!("{} must be a valid email address", spec.label))
        }
        FieldKind::Phone if !PHONE_RE.is_match(text) => {
            Some(format!("{} must be a valid phone number", spec.label))
        }
        FieldKind::Number if text.parse::<f64>().is_err() => {
            Some(format!("{} must be a number", spec.label))
        }
        _ => None,
    }
}
