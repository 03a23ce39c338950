use std::fmt::Display;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::schema::{FilterField, FormSchema};

/// One entity the remote API manages, and everything the generic
/// filter / list / form triple needs to know about it.
pub trait Resource: DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Admin endpoint, relative to the API base URL.
    const ENDPOINT: &'static str;
    /// Unauthenticated listing used by the marketing site, if any.
    const PUBLIC_ENDPOINT: Option<&'static str> = None;
    /// Key of the row array inside `data` of a list response.
    const LIST_KEY: &'static str;
    /// Cache tag for reads of this entity.
    const TAG: &'static str;
    /// Other tags a mutation of this entity makes stale.
    const DEPENDENT_TAGS: &'static [&'static str] = &[];
    /// Human name used in panels ("No courses found").
    const LABEL: &'static str;

    fn id(&self) -> i64;

    fn filters() -> Vec<FilterField> {
        vec![FilterField::search(), FilterField::sort_order()]
    }

    fn columns() -> &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    fn form_schema() -> FormSchema;
}

pub(crate) fn or_dash<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
